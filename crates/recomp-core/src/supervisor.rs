//! Per-frame driver.
//!
//! A frame latches the controller inputs, moves the PPU through the end of the
//! previous VBlank and the start of the next, lets the [`NmiScheduler`] decide
//! whether an interrupt is delivered, and if so runs the game's NMI handler
//! under a watchdog.
//!
//! The console and the handler are moved into the watchdog thread for the
//! duration of the call and handed back when it returns. If the handler
//! overruns, they stay with the abandoned thread, and because
//! [`FrameSupervisor::run_frame`] consumes `self` there is nothing left to run
//! a second handler with.

mod config;
mod watchdog;

use std::time::{Duration, Instant};

pub use config::{DEFAULT_HANDLER_TIMEOUT, SupervisorConfig, WatchCell, WatchCellParseError};
use watchdog::{Attempt, AttemptOutcome};

use crate::{
    bus::CpuBus,
    console::Console,
    error::{DiagnosticSnapshot, FrameError, HandlerError},
    nmi::{self, NmiDecision, NmiScheduler},
    nmi_trace,
    ram::SharedRam,
};

/// Game logic run once per delivered NMI.
pub trait NmiHandler: Send + 'static {
    fn on_nmi(&mut self, bus: &mut CpuBus<'_>) -> Result<(), HandlerError>;
}

/// Adapter produced by [`handler_fn`].
#[derive(Debug, Clone)]
pub struct FnHandler<F>(F);

impl<F> NmiHandler for FnHandler<F>
where
    F: FnMut(&mut CpuBus<'_>) -> Result<(), HandlerError> + Send + 'static,
{
    fn on_nmi(&mut self, bus: &mut CpuBus<'_>) -> Result<(), HandlerError> {
        (self.0)(bus)
    }
}

/// Wraps a closure as an [`NmiHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: FnMut(&mut CpuBus<'_>) -> Result<(), HandlerError> + Send + 'static,
{
    FnHandler(f)
}

/// What happened during one [`FrameSupervisor::run_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub decision: NmiDecision,
    pub delivered: bool,
    pub elapsed: Duration,
}

/// Totals for a multi-frame run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub delivered: u64,
    pub skipped: u64,
}

type Completed<H> = (Box<Console>, H, Result<(), HandlerError>);

pub struct FrameSupervisor<H> {
    config: SupervisorConfig,
    console: Box<Console>,
    handler: H,
    /// Handle kept outside the console so diagnostics survive an abandoned attempt.
    ram: SharedRam,
    frame: u64,
    last_report: Option<FrameReport>,
}

impl<H> std::fmt::Debug for FrameSupervisor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSupervisor")
            .field("config", &self.config)
            .field("console", &self.console)
            .field("frame", &self.frame)
            .field("last_report", &self.last_report)
            .finish_non_exhaustive()
    }
}

impl<H: NmiHandler> FrameSupervisor<H> {
    pub fn new(config: SupervisorConfig, handler: H) -> Self {
        Self::with_console(config, Console::new(), handler)
    }

    pub fn with_console(config: SupervisorConfig, console: Console, handler: H) -> Self {
        let ram = console.ram().clone();
        Self {
            config,
            console: Box::new(console),
            handler,
            ram,
            frame: 0,
            last_report: None,
        }
    }

    /// Runs one frame with the given controller masks.
    ///
    /// Any error is fatal: the supervisor is consumed and the run is over.
    pub fn run_frame(mut self, port1: u8, port2: u8) -> Result<Self, FrameError> {
        let frame = self.frame;
        let started = Instant::now();

        let decision = {
            let console = &mut *self.console;
            console.controllers_mut().set_buttons(0, port1);
            console.controllers_mut().set_buttons(1, port2);

            console.ppu_mut().end_vblank();
            console.ppu_mut().begin_vblank();

            let task = self.ram.read(self.config.task_addr);
            let mode = self.ram.read(self.config.mode_addr);
            console.scheduler_mut().observe(task, mode);

            let due = console.ppu().should_trigger_nmi();
            let decision = console.scheduler_mut().poll(due);
            if decision == NmiDecision::Skipped {
                tracing::debug!(
                    frame,
                    remaining = console.scheduler().pending_skips(),
                    "NMI skipped"
                );
            }
            if nmi_trace::enabled() {
                let skips = console.scheduler().pending_skips();
                nmi_trace::log_line(&nmi::trace_line(frame, task, mode, due, skips, decision));
            }
            decision
        };

        let delivered = self.console.scheduler_mut().take_pending();
        if delivered {
            self = self.deliver(frame)?;
        }

        let report = FrameReport {
            frame,
            decision,
            delivered,
            elapsed: started.elapsed(),
        };
        tracing::trace!(?report, "frame complete");
        self.last_report = Some(report);
        self.frame += 1;
        Ok(self)
    }

    /// Runs one frame per input pair, stopping at the first error.
    pub fn run_frames<I>(mut self, inputs: I) -> Result<(Self, RunSummary), FrameError>
    where
        I: IntoIterator<Item = [u8; 2]>,
    {
        let mut summary = RunSummary::default();
        let skipped_before = self.console.scheduler().skipped_total();
        for [port1, port2] in inputs {
            self = self.run_frame(port1, port2)?;
            summary.frames += 1;
            summary.delivered += u64::from(self.nmi_delivered());
        }
        summary.skipped = self.console.scheduler().skipped_total() - skipped_before;
        Ok((self, summary))
    }

    fn deliver(self, frame: u64) -> Result<Self, FrameError> {
        let Self {
            config,
            console,
            handler,
            ram,
            frame: next_frame,
            last_report,
        } = self;

        let attempt: Attempt<Completed<H>> =
            Attempt::spawn(format!("nmi-frame-{frame}"), move || {
                let mut console = console;
                let mut handler = handler;
                let result = handler.on_nmi(&mut console.bus());
                (console, handler, result)
            })
            .map_err(|source| {
                tracing::error!(frame, %source, "failed to spawn NMI handler thread");
                FrameError::Spawn { frame, source }
            })?;

        match attempt.wait(config.timeout) {
            AttemptOutcome::Completed((console, handler, Ok(()))) => Ok(Self {
                config,
                console,
                handler,
                ram,
                frame: next_frame,
                last_report,
            }),
            AttemptOutcome::Completed((_, _, Err(source))) => {
                tracing::error!(frame, %source, "NMI handler failed");
                Err(FrameError::HandlerFault { frame, source })
            }
            AttemptOutcome::Crashed(message) => {
                tracing::error!(frame, %message, "NMI handler panicked");
                Err(FrameError::HandlerPanicked { frame, message })
            }
            AttemptOutcome::TimedOut => {
                let snapshot = DiagnosticSnapshot {
                    frame,
                    cells: config
                        .watch
                        .iter()
                        .map(|cell| (cell.label.clone(), ram.read(cell.addr)))
                        .collect(),
                };
                tracing::error!(
                    frame,
                    timeout = ?config.timeout,
                    %snapshot,
                    "NMI handler timed out, abandoning it"
                );
                Err(FrameError::Timeout {
                    timeout: config.timeout,
                    snapshot,
                })
            }
        }
    }
}

impl<H> FrameSupervisor<H> {
    /// Whether the last frame delivered an NMI to the handler.
    pub fn nmi_delivered(&self) -> bool {
        self.last_report.is_some_and(|r| r.delivered)
    }

    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// Number of frames run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Mutable access between frames, e.g. to preload registers.
    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn scheduler(&self) -> &NmiScheduler {
        self.console.scheduler()
    }

    pub fn scheduler_mut(&mut self) -> &mut NmiScheduler {
        self.console.scheduler_mut()
    }

    pub fn ram(&self) -> &SharedRam {
        &self.ram
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_parts(self) -> (Console, H) {
        (*self.console, self.handler)
    }
}
