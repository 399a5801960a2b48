mod args;
mod demo;

use std::{fs, time::Duration};

use anyhow::Context;
use clap::Parser;
use recomp_core::{FrameSupervisor, NmiDecision, RunSummary, SupervisorConfig};
use recomp_support::{
    Movie,
    tas::{self, bare, fm2},
};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::{
    args::{Args, MovieFormat},
    demo::{DemoHandler, PAD1_CELL},
};

fn load_movie(args: &Args) -> anyhow::Result<Movie> {
    let movie = match args.format {
        MovieFormat::Auto => Movie::from_path(&args.movie)?,
        MovieFormat::Fm2 => {
            let text = fs::read_to_string(&args.movie)?;
            fm2::parse_str(&text)?
        }
        MovieFormat::Bare => {
            let text = fs::read_to_string(&args.movie)?;
            bare::parse_str(&text)?
        }
    };
    Ok(movie)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let movie = load_movie(&args)
        .with_context(|| format!("failed to load movie {}", args.movie.display()))?;
    let frames = args.frames.unwrap_or(movie.len());
    info!(
        path = %args.movie.display(),
        authored = movie.len(),
        frames,
        pal = movie.is_pal,
        "movie loaded"
    );

    let config = SupervisorConfig {
        timeout: Duration::from_millis(args.timeout_ms),
        watch: args.watch.clone(),
        ..SupervisorConfig::default()
    };
    let mut sup = FrameSupervisor::new(config, DemoHandler::default());
    DemoHandler::boot(&mut sup.console_mut().bus());
    if args.skip > 0 {
        sup.scheduler_mut().skip(args.skip);
    }

    let summary = if args.per_frame {
        let mut summary = RunSummary::default();
        for (index, input) in movie.inputs(frames).enumerate() {
            sup = sup.run_frame(input[0], input[1])?;
            summary.frames += 1;
            if let Some(report) = sup.last_report() {
                summary.delivered += u64::from(report.delivered);
                summary.skipped += u64::from(report.decision == NmiDecision::Skipped);
                println!(
                    "{index:>6} p1={} p2={} nmi={:<7} pad1=${:02X}",
                    tas::tokens::format_mask(input[0]),
                    tas::tokens::format_mask(input[1]),
                    report.decision,
                    sup.ram().read(PAD1_CELL),
                );
            }
        }
        summary
    } else {
        let (next, summary) = sup.run_frames(movie.inputs(frames))?;
        sup = next;
        summary
    };

    println!(
        "frames={} delivered={} skipped={} handler_runs={}",
        summary.frames,
        summary.delivered,
        summary.skipped,
        sup.handler().delivered()
    );
    Ok(())
}
