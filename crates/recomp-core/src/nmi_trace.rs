//! Optional per-frame trace of scheduler decisions.
//!
//! Enabled by pointing `RECOMP_NMI_TRACE_PATH` at a writable file. The file is
//! truncated on first use and receives one line per frame.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::sync::OnceLock;

use parking_lot::Mutex;

pub const TRACE_PATH_ENV: &str = "RECOMP_NMI_TRACE_PATH";

static NMI_TRACE_LOG: OnceLock<Option<Mutex<BufWriter<std::fs::File>>>> = OnceLock::new();

#[inline]
pub(crate) fn flag(value: bool) -> u8 {
    u8::from(value)
}

pub(crate) fn enabled() -> bool {
    sink().is_some()
}

pub(crate) fn log_line(line: &str) {
    if let Some(writer) = sink() {
        let mut w = writer.lock();
        let _ = writeln!(w, "{line}");
        let _ = w.flush();
    }
}

fn sink() -> Option<&'static Mutex<BufWriter<std::fs::File>>> {
    NMI_TRACE_LOG
        .get_or_init(|| {
            let path = std::env::var(TRACE_PATH_ENV).ok()?;
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .ok()
                .map(|f| Mutex::new(BufWriter::with_capacity(64 * 1024, f)))
        })
        .as_ref()
}
