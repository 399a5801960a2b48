use std::{str::FromStr, time::Duration};

use thiserror::Error;

use crate::memory::cpu as cpu_mem;

/// Roughly one real-time second.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(1);

/// A memory cell recorded in the diagnostic snapshot on timeout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchCell {
    pub label: String,
    pub addr: u16,
}

impl WatchCell {
    pub fn new(label: impl Into<String>, addr: u16) -> Self {
        Self {
            label: label.into(),
            addr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchCellParseError {
    #[error("expected `label=addr`, got `{0}`")]
    MissingSeparator(String),
    #[error("watch label is empty")]
    EmptyLabel,
    #[error("invalid address `{0}` (use decimal, `0x1F` or `$1F`)")]
    InvalidAddress(String),
}

/// Parses `label=addr` where `addr` is decimal, `0x`-prefixed or `$`-prefixed hex.
impl FromStr for WatchCell {
    type Err = WatchCellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, addr) = s
            .split_once('=')
            .ok_or_else(|| WatchCellParseError::MissingSeparator(s.to_string()))?;
        let label = label.trim();
        if label.is_empty() {
            return Err(WatchCellParseError::EmptyLabel);
        }
        let addr = parse_addr(addr.trim())
            .ok_or_else(|| WatchCellParseError::InvalidAddress(addr.to_string()))?;
        Ok(Self::new(label, addr))
    }
}

fn parse_addr(s: &str) -> Option<u16> {
    if let Some(hex) = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'))
    {
        u16::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

/// Frame supervisor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Maximum wall-clock time a single NMI handler run may take.
    pub timeout: Duration,
    /// Address of the coarse program-phase cell fed to the NMI scheduler.
    pub task_addr: u16,
    /// Address of the mode cell fed to the NMI scheduler.
    pub mode_addr: u16,
    /// Cells captured, in order, when the handler times out.
    pub watch: Vec<WatchCell>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HANDLER_TIMEOUT,
            task_addr: cpu_mem::DEFAULT_TASK_ADDR,
            mode_addr: cpu_mem::DEFAULT_MODE_ADDR,
            watch: Vec::new(),
        }
    }
}

impl SupervisorConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_task_cells(mut self, task_addr: u16, mode_addr: u16) -> Self {
        self.task_addr = task_addr;
        self.mode_addr = mode_addr;
        self
    }

    pub fn watch(mut self, label: impl Into<String>, addr: u16) -> Self {
        self.watch.push(WatchCell::new(label, addr));
        self
    }
}
