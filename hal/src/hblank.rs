//! # HBlank Register Streaming
//!
//! Per-scanline effects work by rewriting registers during the horizontal
//! blank that precedes each visible line. An [`HblankStream`] is the list of
//! `(register, line table)` pairs to apply; the HBlank interrupt handler calls
//! [`HblankStream::on_hblank`] with the current `VCOUNT` and every register
//! gets the value for the upcoming line.
//!
//! ```ignore
//! // vblank handler, after the effects commit:
//! effects.load_stream(&mut STREAM);
//! set_hblank_irq(regs, !STREAM.is_empty());
//!
//! // hblank handler:
//! STREAM.on_hblank(regs.vcount.read(), &mut Mmio);
//! ```
//!
//! The stream only holds raw pointers to the tables, so whoever loads it must
//! keep them alive and unchanged until the next load.

use crate::display::{next_visible_line, DisplayStatus, HEIGHT};
use crate::registers::{DisplayRegisters, RegisterAddress};

/// Sink for register writes.
pub trait RegisterWriter {
    fn write(&mut self, address: RegisterAddress, value: u16);
}

/// Writes straight to the hardware.
pub struct Mmio;

impl RegisterWriter for Mmio {
    #[inline(always)]
    fn write(&mut self, address: RegisterAddress, value: u16) {
        unsafe { core::ptr::write_volatile(address.as_mut_ptr(), value) }
    }
}

/// One register driven from a line table.
#[derive(Copy, Clone, Debug)]
pub struct HblankEntry {
    pub dest: RegisterAddress,
    /// First of [`HEIGHT`] consecutive values.
    pub src: *const u16,
}

/// Registers rewritten every HBlank, at most `N` of them.
pub struct HblankStream<const N: usize> {
    entries: [Option<HblankEntry>; N],
    len: usize,
}

impl<const N: usize> Default for HblankStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> HblankStream<N> {
    pub const fn new() -> Self {
        Self { entries: [None; N], len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.entries = [None; N];
        self.len = 0;
    }

    /// Replaces the streamed registers.
    ///
    /// # Safety
    /// Every `src` must point to [`HEIGHT`] readable `u16`s that stay valid
    /// and unmodified until the stream is loaded again or cleared.
    pub unsafe fn load(&mut self, entries: &[HblankEntry]) {
        assert!(entries.len() <= N, "Too many hblank entries: {} - {}", entries.len(), N);
        self.clear();
        for (slot, entry) in self.entries.iter_mut().zip(entries) {
            *slot = Some(*entry);
        }
        self.len = entries.len();
    }

    /// Writes the values of the line after `vcount` to every streamed register.
    #[inline]
    pub fn on_hblank<W: RegisterWriter>(&self, vcount: u16, writer: &mut W) {
        let Some(line) = next_visible_line(vcount) else {
            return;
        };
        debug_assert!(line < HEIGHT);
        for entry in self.entries[..self.len].iter().flatten() {
            let value = unsafe { *entry.src.add(line) };
            writer.write(entry.dest, value);
        }
    }
}

/// Enables or disables the HBlank interrupt request in `DISPSTAT`.
pub fn set_hblank_irq(registers: &DisplayRegisters, enabled: bool) {
    unsafe {
        registers.status.modify(|bits| {
            let mut status = DisplayStatus::from_bits_retain(bits);
            status.set(DisplayStatus::HBLANK_IRQ, enabled);
            status.bits()
        });
    }
}
