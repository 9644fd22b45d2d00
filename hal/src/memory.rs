//! # Video Memory Banks
//!
//! Graphics data lives in four fixed banks. None of them can be resized or
//! remapped, so everything that wants tiles or colors on screen has to fit
//! inside these byte ranges:
//!
//! | Bank | Address | Size |
//! |------|---------|------|
//! | Background palettes | `$0500_0000` | 512 bytes (256 colors) |
//! | Sprite palettes | `$0500_0200` | 512 bytes (256 colors) |
//! | Background tiles | `$0600_0000` | 64KB |
//! | Sprite tiles | `$0601_0000` | 32KB |
//!
//! Palette RAM and VRAM ignore 8-bit writes (or worse, duplicate them), so
//! [`MmioBank`] only ever issues 16-bit volatile accesses.

use core::fmt;

use crate::registers::RegisterAddress;

/// Allocation unit of every bank: one 16-color palette or one 4bpp tile.
pub const GRANULARITY: usize = 32;

/// One of the fixed hardware memory banks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BankId {
    BgPalettes,
    SpritePalettes,
    BgTiles,
    SpriteTiles,
}

impl BankId {
    pub const ALL: [BankId; 4] = [
        BankId::BgPalettes,
        BankId::SpritePalettes,
        BankId::BgTiles,
        BankId::SpriteTiles,
    ];

    #[inline(always)]
    pub const fn base(self) -> u32 {
        match self {
            BankId::BgPalettes => 0x0500_0000,
            BankId::SpritePalettes => 0x0500_0200,
            BankId::BgTiles => 0x0600_0000,
            BankId::SpriteTiles => 0x0601_0000,
        }
    }

    #[inline(always)]
    pub const fn size(self) -> usize {
        match self {
            BankId::BgPalettes | BankId::SpritePalettes => 512,
            BankId::BgTiles => 0x1_0000,
            BankId::SpriteTiles => 0x8000,
        }
    }

    #[inline(always)]
    pub const fn granularity(self) -> usize {
        GRANULARITY
    }

    pub const fn is_palette(self) -> bool {
        matches!(self, BankId::BgPalettes | BankId::SpritePalettes)
    }

    /// Absolute address of the half-word at `offset` inside this bank.
    pub const fn address(self, offset: usize) -> RegisterAddress {
        RegisterAddress::new(self.base() + offset as u32)
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BankId::BgPalettes => "bg palettes",
            BankId::SpritePalettes => "sprite palettes",
            BankId::BgTiles => "bg tiles",
            BankId::SpriteTiles => "sprite tiles",
        };
        f.write_str(name)
    }
}

/// Byte-addressed access to the contents of one bank.
///
/// Offsets are relative to the start of the bank. Implementations may buffer
/// writes; [`VideoMemory::flush`] pushes them to wherever the display reads.
pub trait VideoMemory {
    fn size(&self) -> usize;

    fn read(&self, offset: usize, out: &mut [u8]);

    fn write(&mut self, offset: usize, bytes: &[u8]);

    /// Moves `len` bytes from `from` to `to`. The ranges may overlap.
    fn copy_within(&mut self, from: usize, to: usize, len: usize);

    /// Compares the stored bytes at `offset` with `bytes`.
    fn contains_at(&self, offset: usize, bytes: &[u8]) -> bool {
        let mut chunk = [0u8; 64];
        let mut position = 0;
        while position < bytes.len() {
            let count = (bytes.len() - position).min(chunk.len());
            self.read(offset + position, &mut chunk[..count]);
            if chunk[..count] != bytes[position..position + count] {
                return false;
            }
            position += count;
        }
        true
    }

    fn flush(&mut self) {}
}

/// Direct volatile access to a hardware bank.
pub struct MmioBank {
    bank: BankId,
}

impl MmioBank {
    /// # Safety
    /// Only valid on the target. Writes go straight to video memory, so they
    /// should happen in vertical blank or with the display force-blanked.
    pub unsafe fn new(bank: BankId) -> Self {
        Self { bank }
    }

    #[inline(always)]
    fn word_ptr(&self, offset: usize) -> *mut u16 {
        self.bank.address(offset).as_mut_ptr()
    }

    #[inline(always)]
    fn check_range(&self, offset: usize, len: usize) {
        assert!(offset % 2 == 0 && len % 2 == 0, "Unaligned video memory access: {} - {}", offset, len);
        assert!(offset + len <= self.bank.size(), "Video memory access out of {}: {} - {}", self.bank, offset, len);
    }
}

impl VideoMemory for MmioBank {
    fn size(&self) -> usize {
        self.bank.size()
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        self.check_range(offset, out.len());
        for (index, pair) in out.chunks_exact_mut(2).enumerate() {
            let word = unsafe { core::ptr::read_volatile(self.word_ptr(offset + index * 2)) };
            pair.copy_from_slice(&word.to_le_bytes());
        }
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.check_range(offset, bytes.len());
        for (index, pair) in bytes.chunks_exact(2).enumerate() {
            let word = u16::from_le_bytes([pair[0], pair[1]]);
            unsafe { core::ptr::write_volatile(self.word_ptr(offset + index * 2), word) };
        }
    }

    fn copy_within(&mut self, from: usize, to: usize, len: usize) {
        self.check_range(from, len);
        self.check_range(to, len);
        let words = len / 2;
        let copy_word = |index: usize| unsafe {
            let word = core::ptr::read_volatile(self.word_ptr(from + index * 2));
            core::ptr::write_volatile(self.word_ptr(to + index * 2), word);
        };
        if to <= from {
            (0..words).for_each(&copy_word);
        } else {
            (0..words).rev().for_each(&copy_word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_layout() {
        assert_eq!(BankId::SpritePalettes.base(), BankId::BgPalettes.base() + 512);
        assert_eq!(BankId::SpriteTiles.base(), BankId::BgTiles.base() + BankId::BgTiles.size() as u32);
        assert_eq!(BankId::SpritePalettes.address(2 * 17).get(), 0x0500_0222);
        assert!(BankId::BgPalettes.is_palette());
        assert!(!BankId::SpriteTiles.is_palette());
        for bank in BankId::ALL {
            assert_eq!(bank.size() % bank.granularity(), 0);
        }
    }
}
