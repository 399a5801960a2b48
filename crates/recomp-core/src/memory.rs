//! Shared definitions for the emulated address space.
//!
//! Only the handful of locations the dispatcher intercepts are named here.
//! Every other address is plain storage owned by the game logic.

/// CPU-visible address map details.
pub mod cpu {
    /// Total size of the flat address space handed to the game logic.
    pub const ADDRESS_SPACE_SIZE: usize = 0x1_0000;

    /// First CPU address mapped to the PPU register mirror.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    /// Last CPU address mirrored to the PPU register set.
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    /// OAM DMA trigger (`$4014`). The written value selects the source page.
    pub const OAM_DMA: u16 = 0x4014;
    /// Controller port 1 strobe/read address (`$4016`).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 read address (`$4017`). Writes fall through to RAM.
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// Bits that float high on controller reads.
    pub const CONTROLLER_OPEN_BUS: u8 = 0x40;

    /// Default location of the coarse program-phase ("task") cell.
    pub const DEFAULT_TASK_ADDR: u16 = 0x0770;
    /// Default location of the game mode cell.
    pub const DEFAULT_MODE_ADDR: u16 = 0x0772;
}

/// PPU register layout and internal memory sizes.
pub mod ppu {
    /// First CPU-visible PPU register address.
    pub const REGISTER_BASE: u16 = 0x2000;
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Size of the PPU address space backed by [`crate::ppu::Ppu`] (16 KiB).
    pub const VRAM_SIZE: usize = 0x4000;
    /// Address mask applied to every VRAM access to wrap to the 16 KiB space.
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Primary Object Attribute Memory (OAM) byte count.
    pub const OAM_RAM_SIZE: usize = 0x100;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Raw address backing the register.
        pub const fn addr(self) -> u16 {
            self as u16
        }

        /// Resolves the canonical register for any address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}
