//! Built-in stand-in for a game's NMI routine.
//!
//! It reads both pads the way game code does (strobe, then eight serial
//! reads) and stores the masks in zero page, bumps a frame counter, and
//! copies a shadow OAM page with `$4014`.

use recomp_core::{CpuBus, HandlerError, NmiHandler, memory::cpu as cpu_mem, ppu::Control};

pub const PAD1_CELL: u16 = 0x00F7;
pub const PAD2_CELL: u16 = 0x00F8;
pub const NMI_COUNT_CELL: u16 = 0x0009;
/// Page of the shadow OAM buffer copied on every NMI.
pub const SHADOW_OAM_PAGE: u8 = 0x02;

#[derive(Debug, Default)]
pub struct DemoHandler {
    delivered: u64,
}

impl DemoHandler {
    /// Reset-routine setup: enable NMI generation.
    pub fn boot(bus: &mut CpuBus<'_>) {
        bus.write(0x2000, Control::GENERATE_NMI.bits());
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

fn read_pad(bus: &mut CpuBus<'_>, port: u16) -> u8 {
    (0..8).fold(0u8, |mask, bit| mask | ((bus.read(port) & 0x01) << bit))
}

impl NmiHandler for DemoHandler {
    fn on_nmi(&mut self, bus: &mut CpuBus<'_>) -> Result<(), HandlerError> {
        bus.write(cpu_mem::OAM_DMA, SHADOW_OAM_PAGE);

        bus.write(cpu_mem::CONTROLLER_PORT_1, 1);
        bus.write(cpu_mem::CONTROLLER_PORT_1, 0);
        let pad1 = read_pad(bus, cpu_mem::CONTROLLER_PORT_1);
        let pad2 = read_pad(bus, cpu_mem::CONTROLLER_PORT_2);
        bus.write(PAD1_CELL, pad1);
        bus.write(PAD2_CELL, pad2);

        let count = bus.read(NMI_COUNT_CELL);
        bus.write(NMI_COUNT_CELL, count.wrapping_add(1));
        self.delivered += 1;
        Ok(())
    }
}
