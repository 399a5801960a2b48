//! Address-space dispatcher used by the game logic.
//!
//! Routes CPU-style reads and writes between the PPU registers, the controller
//! ports, the OAM DMA trigger, and the flat [`SharedRam`].

use crate::{
    controller::ControllerPorts,
    memory::cpu as cpu_mem,
    ppu::Ppu,
    ram::SharedRam,
};

/// CPU-visible bus that borrows the devices from the owning console.
#[derive(Debug)]
pub struct CpuBus<'a> {
    ppu: &'a mut Ppu,
    controllers: &'a mut ControllerPorts,
    ram: &'a SharedRam,
}

impl<'a> CpuBus<'a> {
    pub fn new(ppu: &'a mut Ppu, controllers: &'a mut ControllerPorts, ram: &'a SharedRam) -> Self {
        Self {
            ppu,
            controllers,
            ram,
        }
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => self.ppu.cpu_read(addr),
            cpu_mem::CONTROLLER_PORT_1 => cpu_mem::CONTROLLER_OPEN_BUS | self.controllers.read(0),
            cpu_mem::CONTROLLER_PORT_2 => cpu_mem::CONTROLLER_OPEN_BUS | self.controllers.read(1),
            _ => self.ram.read(addr),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                self.ppu.cpu_write(addr, value)
            }
            cpu_mem::OAM_DMA => {
                let page = self.ram.read_page(value);
                self.ppu.oam_dma(&page);
            }
            cpu_mem::CONTROLLER_PORT_1 => self.controllers.write_strobe(value),
            _ => self.ram.write(addr, value),
        }
    }

    /// Reads without touching any device state.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => self.ppu.peek(addr),
            cpu_mem::CONTROLLER_PORT_1 => cpu_mem::CONTROLLER_OPEN_BUS | self.controllers.peek(0),
            cpu_mem::CONTROLLER_PORT_2 => cpu_mem::CONTROLLER_OPEN_BUS | self.controllers.peek(1),
            _ => self.ram.read(addr),
        }
    }

    /// Little-endian 16-bit read from plain memory.
    pub fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr);
        let hi = self.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub fn ppu(&self) -> &Ppu {
        self.ppu
    }

    pub fn controllers(&self) -> &ControllerPorts {
        self.controllers
    }

    pub fn ram(&self) -> &SharedRam {
        self.ram
    }
}
