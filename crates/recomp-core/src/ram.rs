use core::ops::{Deref, DerefMut};
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use crate::memory::cpu as cpu_mem;

/// Fixed-size byte store owned by a single device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ram<const N: usize>(Box<[u8; N]>);

pub mod ppu {
    use crate::memory::ppu as ppu_mem;

    pub type Vram = super::Ram<{ ppu_mem::VRAM_SIZE }>;
    pub type OamRam = super::Ram<{ ppu_mem::OAM_RAM_SIZE }>;
}

impl<const N: usize> Ram<N> {
    pub fn new() -> Self {
        Self(Box::new([0; N]))
    }

    pub fn read(&self, addr: usize) -> u8 {
        self.0[addr % N]
    }

    pub fn write(&mut self, addr: usize, value: u8) {
        self.0[addr % N] = value;
    }
}

impl<const N: usize> Default for Ram<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Deref for Ram<N> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl<const N: usize> DerefMut for Ram<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut_slice()
    }
}

/// The flat 64 KiB region shared between the core and the game logic.
///
/// Cells are individually atomic so a handle kept by the supervisor can read
/// diagnostics while an abandoned handler thread is still writing. There is no
/// ordering between cells; this is plain byte storage, not a synchronization
/// primitive.
#[derive(Clone)]
pub struct SharedRam {
    cells: Arc<[AtomicU8]>,
}

impl SharedRam {
    pub fn new() -> Self {
        let cells: Arc<[AtomicU8]> = (0..cpu_mem::ADDRESS_SPACE_SIZE)
            .map(|_| AtomicU8::new(0))
            .collect();
        Self { cells }
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.cells[addr as usize].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write(&self, addr: u16, value: u8) {
        self.cells[addr as usize].store(value, Ordering::Relaxed);
    }

    /// Copies the 256-byte page starting at `page << 8`.
    pub fn read_page(&self, page: u8) -> [u8; 256] {
        let base = u16::from(page) << 8;
        std::array::from_fn(|i| self.read(base.wrapping_add(i as u16)))
    }

    /// Writes `data` starting at `addr`, wrapping at the end of the space.
    pub fn load(&self, addr: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            self.write(addr.wrapping_add(offset as u16), byte);
        }
    }

    /// Zeroes every cell.
    pub fn clear(&self) {
        for cell in self.cells.iter() {
            cell.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for SharedRam {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SharedRam {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedRam")
            .field("len", &self.cells.len())
            .finish()
    }
}
