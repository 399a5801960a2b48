#![allow(dead_code)]

use recomp_core::{CpuBus, HandlerError, memory::cpu as cpu_mem, ppu::Control};

/// Where the demo handler stores the decoded port 1 mask.
pub const PAD1_CELL: u16 = 0x00F7;
/// Incremented by the demo handler on every delivered NMI.
pub const NMI_COUNT_CELL: u16 = 0x0009;
pub const TASK_CELL: u16 = cpu_mem::DEFAULT_TASK_ADDR;
pub const MODE_CELL: u16 = cpu_mem::DEFAULT_MODE_ADDR;

/// Strobes the pads and reads port 1 back in canonical bit order (A = bit 0).
pub fn read_pad1(bus: &mut CpuBus<'_>) -> u8 {
    bus.write(cpu_mem::CONTROLLER_PORT_1, 1);
    bus.write(cpu_mem::CONTROLLER_PORT_1, 0);
    let mut mask = 0u8;
    for bit in 0..8 {
        mask |= (bus.read(cpu_mem::CONTROLLER_PORT_1) & 0x01) << bit;
    }
    mask
}

/// Minimal stand-in for the game's NMI routine.
pub fn copy_pad_handler(bus: &mut CpuBus<'_>) -> Result<(), HandlerError> {
    let pad = read_pad1(bus);
    bus.write(PAD1_CELL, pad);
    let count = bus.read(NMI_COUNT_CELL);
    bus.write(NMI_COUNT_CELL, count.wrapping_add(1));
    Ok(())
}

/// What the game's reset routine does before the first frame.
pub fn boot(bus: &mut CpuBus<'_>) {
    bus.write(0x2000, Control::GENERATE_NMI.bits());
}
