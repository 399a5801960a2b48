//! Peripheral emulation and frame scheduling for running decompiled NES game
//! logic against deterministic input.
//!
//! The crate models just enough hardware for the game code to talk to: the PPU
//! register file ([`ppu::Ppu`]), the two controller ports
//! ([`controller::ControllerPorts`]), and the `$4014` OAM DMA bridge, all
//! reachable through [`bus::CpuBus`]. Once per frame the
//! [`supervisor::FrameSupervisor`] decides, with help from
//! [`nmi::NmiScheduler`], whether the game's NMI handler runs, and runs it
//! under a watchdog.

pub mod bus;
pub mod console;
pub mod controller;
pub mod error;
pub mod memory;
pub mod nmi;
pub mod nmi_trace;
pub mod ppu;
pub mod ram;
pub mod supervisor;

pub use bus::CpuBus;
pub use console::Console;
pub use controller::{Button, ControllerPorts};
pub use error::{DiagnosticSnapshot, FrameError, HandlerError};
pub use nmi::{NmiDecision, NmiScheduler};
pub use ppu::{Ppu, PpuConfig};
pub use ram::SharedRam;
pub use supervisor::{
    FrameReport, FrameSupervisor, NmiHandler, RunSummary, SupervisorConfig, WatchCell, handler_fn,
};
