use std::{fmt, io, time::Duration};

use thiserror::Error;

/// Error type returned by an [`crate::supervisor::NmiHandler`].
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// State captured when a handler overruns its time budget.
///
/// `cells` keeps the order in which the caller registered the watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticSnapshot {
    pub frame: u64,
    pub cells: Vec<(String, u8)>,
}

impl DiagnosticSnapshot {
    /// Looks up a captured cell by label.
    pub fn get(&self, label: &str) -> Option<u8> {
        self.cells
            .iter()
            .find(|(name, _)| name == label)
            .map(|&(_, value)| value)
    }
}

impl fmt::Display for DiagnosticSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame={}", self.frame)?;
        for (label, value) in &self.cells {
            write!(f, " {label}={value:#04X}")?;
        }
        Ok(())
    }
}

/// Failures surfaced by the frame supervisor. Every variant ends the run.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("NMI handler failed at frame {frame}: {source}")]
    HandlerFault {
        frame: u64,
        #[source]
        source: HandlerError,
    },
    #[error("NMI handler panicked at frame {frame}: {message}")]
    HandlerPanicked { frame: u64, message: String },
    #[error("NMI handler exceeded {timeout:?} ({snapshot})")]
    Timeout {
        timeout: Duration,
        snapshot: DiagnosticSnapshot,
    },
    #[error("failed to spawn NMI handler thread at frame {frame}: {source}")]
    Spawn {
        frame: u64,
        #[source]
        source: io::Error,
    },
}

impl FrameError {
    /// Frame on which the run stopped.
    pub fn frame(&self) -> u64 {
        match self {
            Self::HandlerFault { frame, .. }
            | Self::HandlerPanicked { frame, .. }
            | Self::Spawn { frame, .. } => *frame,
            Self::Timeout { snapshot, .. } => snapshot.frame,
        }
    }

    pub fn snapshot(&self) -> Option<&DiagnosticSnapshot> {
        match self {
            Self::Timeout { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_lists_cells_in_order() {
        let err = FrameError::Timeout {
            timeout: Duration::from_millis(250),
            snapshot: DiagnosticSnapshot {
                frame: 42,
                cells: vec![("task".into(), 1), ("mode".into(), 0x1F)],
            },
        };
        assert_eq!(err.frame(), 42);
        assert_eq!(
            err.to_string(),
            "NMI handler exceeded 250ms (frame=42 task=0x01 mode=0x1F)"
        );
        assert_eq!(err.snapshot().and_then(|s| s.get("mode")), Some(0x1F));
    }
}
