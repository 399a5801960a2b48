use bitflags::bitflags;

bitflags! {
    /// PPU control register (`$2000`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N M S B s I n n
    /// ```
    /// - `n n`: base nametable select
    /// - `I`: VRAM increment (0=+1, 1=+32)
    /// - `s`: sprite pattern table (8x8)
    /// - `B`: background pattern table
    /// - `S`: sprite size (0=8x8, 1=8x16)
    /// - `M`: master/slave select
    /// - `N`: generate NMI at VBlank start
    ///
    /// Only `I` and `N` change the behavior of this core; the remaining bits
    /// are stored so the game logic can read back what it wrote.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Control: u8 {
        const NAMETABLE = 0b0000_0011;
        /// VRAM address increment unit. `0` adds 1, `1` adds 32.
        const INCREMENT_32 = 0b0000_0100;
        const SPRITE_TABLE = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        /// Enables NMI generation at the start of VBlank.
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    /// Returns the VRAM increment amount (1 or 32) based on bit 2.
    pub fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Indicates whether the PPU should fire an NMI at the start of VBlank.
    pub fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}
