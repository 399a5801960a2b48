//! CPU-visible PPU register state.
//!
//! This module mirrors the `$2000-$2007` register set. The concrete bit
//! layouts live in submodules.

mod control;
mod mask;
mod status;
mod vram_registers;

pub use control::Control;
pub use mask::Mask;
pub use status::Status;
pub(crate) use vram_registers::VramRegisters;

use crate::ram::ppu::OamRam;

/// Aggregates the state of all CPU visible PPU registers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct Registers {
    /// Mirror of the control register (`$2000`).
    pub(crate) control: Control,
    /// Mirror of the mask register (`$2001`).
    pub(crate) mask: Mask,
    /// Status register (`$2002`).
    pub(crate) status: Status,
    /// Current OAM pointer driven by `$2003`/`$2004`.
    pub(crate) oam_addr: u8,
    /// Primary sprite memory accessible through `$2004` and `$4014`.
    pub(crate) oam: OamRam,
    /// Scroll/address latches and the shared write toggle.
    pub(crate) vram: VramRegisters,
}

impl Registers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        *self = Registers::new();
    }
}
