//! Picture Processing Unit (PPU) register device.
//!
//! The NES PPU exposes eight CPU-facing registers between `$2000` and `$2007`,
//! mirrored every eight bytes up to `$3FFF`. This module implements only the
//! register layer and the two memories behind it (VRAM and OAM); nothing is
//! rendered. Frame timing is reduced to two calls per frame,
//! [`Ppu::begin_vblank`] and [`Ppu::end_vblank`].
//!
//! Sprite-0 hit is synthesized rather than computed: after a configurable
//! number of status reads following the start of VBlank the flag appears, which
//! is enough for code that busy-polls `$2002` waiting for it.

mod registers;

use core::fmt;

use crate::{
    memory::ppu::{self as ppu_mem, Register as PpuRegister},
    ram::ppu::Vram,
};
use registers::Registers;
pub use registers::{Control, Mask, Status};

/// Status reads after `begin_vblank` before sprite-0 hit is reported.
pub const DEFAULT_SPRITE0_HIT_DELAY_READS: u8 = 3;

/// Tunables for the synthetic parts of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PpuConfig {
    /// Number of `$2002` reads that must happen before sprite-0 hit is set.
    /// An approximation of scanline progress, not a measured constant.
    pub sprite0_hit_delay_reads: u8,
}

impl Default for PpuConfig {
    fn default() -> Self {
        Self {
            sprite0_hit_delay_reads: DEFAULT_SPRITE0_HIT_DELAY_READS,
        }
    }
}

/// Entry points for the CPU PPU register mirror.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ppu {
    /// Collection of CPU visible registers and their helper latches.
    registers: Registers,
    /// 16 KiB PPU address space. Every access is masked to `$0000-$3FFF`.
    vram: Vram,
    /// Status reads since the last `begin_vblank` while sprite-0 hit was clear.
    status_reads_since_vblank: u8,
    /// Total number of frames completed via `end_vblank`.
    frame: u64,
    config: PpuConfig,
}

impl fmt::Debug for Ppu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ppu")
            .field("registers", &self.registers)
            .field("status_reads_since_vblank", &self.status_reads_since_vblank)
            .field("frame", &self.frame)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    /// Creates a new PPU instance with cleared memories and default register values.
    pub fn new() -> Self {
        Self::with_config(PpuConfig::default())
    }

    pub fn with_config(config: PpuConfig) -> Self {
        Self {
            registers: Registers::new(),
            vram: Vram::new(),
            status_reads_since_vblank: 0,
            frame: 0,
            config,
        }
    }

    /// Restores the device to its power-on state. The configuration is kept.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.vram.fill(0);
        self.status_reads_since_vblank = 0;
        self.frame = 0;
    }

    /// Handles CPU writes to the mirrored PPU register space (`$2000-$3FFF`).
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Control => self.registers.control = Control::from_bits_retain(value),
            PpuRegister::Mask => self.registers.mask = Mask::from_bits_retain(value),
            PpuRegister::Status => {} // read-only
            PpuRegister::OamAddr => self.registers.oam_addr = value,
            PpuRegister::OamData => self.write_oam_data(value),
            PpuRegister::Scroll => self.registers.vram.write_scroll(value),
            PpuRegister::Addr => self.registers.vram.write_addr(value),
            PpuRegister::Data => self.write_vram_data(value),
        }
    }

    /// Handles CPU reads from the mirrored PPU register space (`$2000-$3FFF`).
    ///
    /// Write-only registers read back as zero.
    pub fn cpu_read(&mut self, addr: u16) -> u8 {
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Status => self.read_status(),
            PpuRegister::OamData => self.read_oam_data(),
            PpuRegister::Data => self.read_vram_data(),
            _ => 0,
        }
    }

    /// Register read without side effects.
    pub fn peek(&self, addr: u16) -> u8 {
        match PpuRegister::from_cpu_addr(addr) {
            PpuRegister::Status => self.registers.status.bits(),
            PpuRegister::OamData => self.read_oam_data(),
            PpuRegister::Data => self.vram.read(self.registers.vram.v as usize),
            _ => 0,
        }
    }

    /// Copies a full page into OAM starting at the current `OAMADDR`,
    /// wrapping inside the 256-byte table. `OAMADDR` itself is unchanged.
    pub fn oam_dma(&mut self, page: &[u8; ppu_mem::OAM_RAM_SIZE]) {
        let start = self.registers.oam_addr;
        for (i, &byte) in page.iter().enumerate() {
            let idx = start.wrapping_add(i as u8);
            self.registers.oam[idx as usize] = byte;
        }
    }

    /// Enters VBlank: raises the VBlank flag and rearms sprite-0 hit.
    pub fn begin_vblank(&mut self) {
        self.registers.status.insert(Status::VERTICAL_BLANK);
        self.registers.status.remove(Status::SPRITE_ZERO_HIT);
        self.status_reads_since_vblank = 0;
    }

    /// Leaves VBlank and closes the frame.
    ///
    /// Sprite 0 is always treated as overlapping an opaque background pixel,
    /// so the hit flag is set unconditionally here.
    pub fn end_vblank(&mut self) {
        self.registers.status.remove(Status::VERTICAL_BLANK);
        self.registers.status.insert(Status::SPRITE_ZERO_HIT);
        self.frame = self.frame.wrapping_add(1);
    }

    /// VBlank is active and the game enabled NMI generation.
    pub fn should_trigger_nmi(&self) -> bool {
        self.registers.status.contains(Status::VERTICAL_BLANK)
            && self.registers.control.nmi_enabled()
    }

    pub fn control(&self) -> Control {
        self.registers.control
    }

    pub fn mask(&self) -> Mask {
        self.registers.mask
    }

    pub fn status(&self) -> Status {
        self.registers.status
    }

    pub fn oam_addr(&self) -> u8 {
        self.registers.oam_addr
    }

    pub fn vram_addr(&self) -> u16 {
        self.registers.vram.v
    }

    /// `(x, y)` as last written through `$2005`.
    pub fn scroll(&self) -> (u8, u8) {
        (self.registers.vram.scroll_x, self.registers.vram.scroll_y)
    }

    /// Whether the next `$2005`/`$2006` write is the second of a pair.
    pub fn write_toggle(&self) -> bool {
        self.registers.vram.w
    }

    pub fn oam(&self) -> &[u8] {
        &self.registers.oam
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> PpuConfig {
        self.config
    }

    fn read_status(&mut self) -> u8 {
        let status = self.registers.status.bits();
        self.registers.status.remove(Status::VERTICAL_BLANK);
        self.registers.vram.reset_latch();

        if !self.registers.status.contains(Status::SPRITE_ZERO_HIT) {
            self.status_reads_since_vblank = self.status_reads_since_vblank.saturating_add(1);
            if self.status_reads_since_vblank >= self.config.sprite0_hit_delay_reads {
                self.registers.status.insert(Status::SPRITE_ZERO_HIT);
            }
        }
        status
    }

    fn write_oam_data(&mut self, value: u8) {
        let idx = self.registers.oam_addr as usize;
        self.registers.oam[idx] = value;
        self.registers.oam_addr = self.registers.oam_addr.wrapping_add(1);
    }

    fn read_oam_data(&self) -> u8 {
        self.registers.oam[self.registers.oam_addr as usize]
    }

    fn write_vram_data(&mut self, value: u8) {
        let addr = self.registers.vram.v;
        self.vram.write(addr as usize, value);
        let increment = self.registers.control.vram_increment();
        self.registers.vram.increment(increment);
    }

    fn read_vram_data(&mut self) -> u8 {
        let addr = self.registers.vram.v;
        let data = self.vram.read(addr as usize);
        let increment = self.registers.control.vram_increment();
        self.registers.vram.increment(increment);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_addr(ppu: &mut Ppu, addr: u16) {
        ppu.cpu_write(PpuRegister::Addr.addr(), (addr >> 8) as u8);
        ppu.cpu_write(PpuRegister::Addr.addr(), addr as u8);
    }

    #[test]
    fn control_register_helpers() {
        let mut ppu = Ppu::new();
        ppu.cpu_write(PpuRegister::Control.addr(), 0b1000_0100);
        assert!(ppu.control().nmi_enabled());
        assert_eq!(ppu.control().vram_increment(), 32);
    }

    #[test]
    fn registers_are_mirrored_every_eight_bytes() {
        let mut ppu = Ppu::new();
        ppu.cpu_write(0x3FF8, 0x80);
        assert!(ppu.control().nmi_enabled());
        ppu.cpu_write(0x2F0B, 0x7F); // OAMADDR mirror
        assert_eq!(ppu.oam_addr(), 0x7F);
    }

    #[test]
    fn vram_data_is_unbuffered() {
        let mut ppu = Ppu::new();
        set_addr(&mut ppu, 0x2000);
        ppu.cpu_write(PpuRegister::Data.addr(), 0x12);
        ppu.cpu_write(PpuRegister::Data.addr(), 0x34);

        set_addr(&mut ppu, 0x2000);
        assert_eq!(ppu.cpu_read(PpuRegister::Data.addr()), 0x12);
        assert_eq!(ppu.cpu_read(PpuRegister::Data.addr()), 0x34);
        assert_eq!(ppu.vram_addr(), 0x2002);
    }

    #[test]
    fn increment_32_advances_by_rows() {
        let mut ppu = Ppu::new();
        ppu.cpu_write(PpuRegister::Control.addr(), Control::INCREMENT_32.bits());
        set_addr(&mut ppu, 0x3FA0);
        let writes = 5u16;
        for i in 0..writes {
            ppu.cpu_write(PpuRegister::Data.addr(), i as u8);
        }
        assert_eq!(ppu.vram_addr(), (0x3FA0 + 32 * writes) & 0x3FFF);
        assert_eq!(ppu.vram()[0x3FC0], 1);
        assert_eq!(ppu.vram()[0x0020], 4, "fifth write wrapped to the bottom");
    }

    #[test]
    fn status_read_resets_scroll_latch() {
        let mut ppu = Ppu::new();
        ppu.cpu_write(PpuRegister::Scroll.addr(), 0x12); // horizontal
        ppu.cpu_write(PpuRegister::Scroll.addr(), 0x34); // vertical
        assert_eq!(ppu.scroll(), (0x12, 0x34));

        // Half-finished address write leaves the toggle set.
        ppu.cpu_write(PpuRegister::Addr.addr(), 0x21);
        assert!(ppu.write_toggle());

        let _ = ppu.cpu_read(PpuRegister::Status.addr());
        ppu.cpu_write(PpuRegister::Scroll.addr(), 0x56);
        assert_eq!(ppu.scroll(), (0x56, 0x34));
    }

    #[test]
    fn scroll_and_addr_share_toggle() {
        let mut ppu = Ppu::new();
        ppu.cpu_write(PpuRegister::Scroll.addr(), 0x10);
        // Toggle is now on the second half, so this lands in the low byte.
        ppu.cpu_write(PpuRegister::Addr.addr(), 0x44);
        assert_eq!(ppu.vram_addr(), 0x0044);
        assert!(!ppu.write_toggle());
    }

    #[test]
    fn status_read_clears_vblank_but_returns_it() {
        let mut ppu = Ppu::new();
        ppu.begin_vblank();
        let first = ppu.cpu_read(PpuRegister::Status.addr());
        assert_ne!(first & Status::VERTICAL_BLANK.bits(), 0);
        let second = ppu.cpu_read(PpuRegister::Status.addr());
        assert_eq!(second & Status::VERTICAL_BLANK.bits(), 0);
    }

    #[test]
    fn sprite0_hit_appears_after_delay() {
        let mut ppu = Ppu::new();
        ppu.begin_vblank();
        let hit = Status::SPRITE_ZERO_HIT.bits();
        for read in 0..3 {
            assert_eq!(ppu.cpu_read(PpuRegister::Status.addr()) & hit, 0, "read {read}");
        }
        assert_ne!(ppu.cpu_read(PpuRegister::Status.addr()) & hit, 0);
        assert_ne!(ppu.cpu_read(PpuRegister::Status.addr()) & hit, 0, "hit is sticky");

        ppu.begin_vblank();
        assert!(!ppu.status().contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn sprite0_delay_is_tunable() {
        let mut ppu = Ppu::with_config(PpuConfig {
            sprite0_hit_delay_reads: 1,
        });
        ppu.begin_vblank();
        let _ = ppu.cpu_read(PpuRegister::Status.addr());
        assert!(ppu.status().contains(Status::SPRITE_ZERO_HIT));
    }

    #[test]
    fn end_vblank_sets_hit_and_counts_frames() {
        let mut ppu = Ppu::new();
        ppu.begin_vblank();
        ppu.end_vblank();
        assert!(!ppu.status().contains(Status::VERTICAL_BLANK));
        assert!(ppu.status().contains(Status::SPRITE_ZERO_HIT));
        assert_eq!(ppu.frame(), 1);
    }

    #[test]
    fn nmi_requires_vblank_and_enable() {
        let mut ppu = Ppu::new();
        ppu.begin_vblank();
        assert!(!ppu.should_trigger_nmi());
        ppu.cpu_write(PpuRegister::Control.addr(), Control::GENERATE_NMI.bits());
        assert!(ppu.should_trigger_nmi());
        let _ = ppu.cpu_read(PpuRegister::Status.addr());
        assert!(!ppu.should_trigger_nmi());
    }

    #[test]
    fn oam_data_auto_increments_on_write_only() {
        let mut ppu = Ppu::new();
        ppu.cpu_write(PpuRegister::OamAddr.addr(), 0xFF);
        ppu.cpu_write(PpuRegister::OamData.addr(), 0xAA);
        ppu.cpu_write(PpuRegister::OamData.addr(), 0xBB);
        assert_eq!(ppu.oam()[0xFF], 0xAA);
        assert_eq!(ppu.oam()[0x00], 0xBB);
        assert_eq!(ppu.oam_addr(), 0x01);

        ppu.cpu_write(PpuRegister::OamAddr.addr(), 0x00);
        assert_eq!(ppu.cpu_read(PpuRegister::OamData.addr()), 0xBB);
        assert_eq!(ppu.cpu_read(PpuRegister::OamData.addr()), 0xBB);
    }

    #[test]
    fn oam_dma_wraps_from_current_address() {
        let mut ppu = Ppu::new();
        ppu.cpu_write(PpuRegister::OamAddr.addr(), 0x10);
        let page: [u8; 256] = std::array::from_fn(|i| i as u8);
        ppu.oam_dma(&page);
        assert_eq!(ppu.oam()[0x10], 0x00);
        assert_eq!(ppu.oam()[0xFF], 0xEF);
        assert_eq!(ppu.oam()[0x00], 0xF0);
        assert_eq!(ppu.oam_addr(), 0x10);
    }

    #[test]
    fn reset_clears_stores_and_keeps_config() {
        let config = PpuConfig {
            sprite0_hit_delay_reads: 5,
        };
        let mut ppu = Ppu::with_config(config);
        set_addr(&mut ppu, 0x0100);
        ppu.cpu_write(PpuRegister::Data.addr(), 0x77);
        ppu.cpu_write(PpuRegister::OamData.addr(), 0x66);
        ppu.end_vblank();
        ppu.reset();
        assert_eq!(ppu, Ppu::with_config(config));
    }
}
