use crate::memory::ppu as ppu_mem;

/// Scroll and address latches driven by `$2005`/`$2006`.
///
/// Both registers share the single write toggle `w`, which a status read
/// also clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct VramRegisters {
    /// Current VRAM address (14 significant bits).
    pub(crate) v: u16,
    /// Horizontal scroll written by the first `$2005` write.
    pub(crate) scroll_x: u8,
    /// Vertical scroll written by the second `$2005` write.
    pub(crate) scroll_y: u8,
    /// Write toggle: false => first write, true => second write.
    pub(crate) w: bool,
}

impl VramRegisters {
    pub(crate) fn write_scroll(&mut self, value: u8) {
        if !self.w {
            self.scroll_x = value;
        } else {
            self.scroll_y = value;
        }
        self.w = !self.w;
    }

    /// High byte first (top two bits dropped), then low byte.
    pub(crate) fn write_addr(&mut self, value: u8) {
        if !self.w {
            let hi = u16::from(value & 0b0011_1111) << 8;
            self.v = hi | (self.v & 0x00FF);
        } else {
            self.v = (self.v & 0x3F00) | u16::from(value);
        }
        self.w = !self.w;
    }

    pub(crate) fn increment(&mut self, step: u16) {
        self.v = self.v.wrapping_add(step) & ppu_mem::VRAM_MIRROR_MASK;
    }

    pub(crate) fn reset_latch(&mut self) {
        self.w = false;
    }
}
