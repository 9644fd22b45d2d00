//! # Background Control (`BGxCNT`)
//!
//! ```text
//!  15 14 | 13 | 12 ... 8 | 7   | 6      | 5 4 | 3 2        | 1 0
//!  size  |wrap| screen   | 8bpp| mosaic |  -  | char block | priority
//! ```
//!
//! The char block selects which 16KB slice of background VRAM the tiles are
//! read from; the screen block selects the 2KB slice holding the map.

use bit_field::BitField;

/// One background control word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BgControl(pub u16);

/// Size of one char block in bytes.
pub const CHAR_BLOCK_SIZE: usize = 0x4000;

/// Size of one screen block in bytes.
pub const SCREEN_BLOCK_SIZE: usize = 0x800;

impl BgControl {
    #[inline]
    pub fn priority(&self) -> u8 {
        self.0.get_bits(0..2) as u8
    }

    #[inline]
    pub fn set_priority(&mut self, priority: u8) -> &mut Self {
        assert!(priority < 4, "Invalid priority: {}", priority);
        self.0.set_bits(0..2, priority as u16);
        self
    }

    #[inline]
    pub fn char_block(&self) -> u8 {
        self.0.get_bits(2..4) as u8
    }

    #[inline]
    pub fn set_char_block(&mut self, block: u8) -> &mut Self {
        assert!(block < 4, "Invalid char block: {}", block);
        self.0.set_bits(2..4, block as u16);
        self
    }

    #[inline]
    pub fn mosaic(&self) -> bool {
        self.0.get_bit(6)
    }

    #[inline]
    pub fn set_mosaic(&mut self, enabled: bool) -> &mut Self {
        self.0.set_bit(6, enabled);
        self
    }

    #[inline]
    pub fn bpp8(&self) -> bool {
        self.0.get_bit(7)
    }

    #[inline]
    pub fn set_bpp8(&mut self, enabled: bool) -> &mut Self {
        self.0.set_bit(7, enabled);
        self
    }

    #[inline]
    pub fn screen_block(&self) -> u8 {
        self.0.get_bits(8..13) as u8
    }

    #[inline]
    pub fn set_screen_block(&mut self, block: u8) -> &mut Self {
        assert!(block < 32, "Invalid screen block: {}", block);
        self.0.set_bits(8..13, block as u16);
        self
    }

    #[inline]
    pub fn wrap(&self) -> bool {
        self.0.get_bit(13)
    }

    #[inline]
    pub fn set_wrap(&mut self, enabled: bool) -> &mut Self {
        self.0.set_bit(13, enabled);
        self
    }

    /// Map size selector: 0 = 256×256, 1 = 512×256, 2 = 256×512, 3 = 512×512.
    #[inline]
    pub fn size(&self) -> u8 {
        self.0.get_bits(14..16) as u8
    }

    #[inline]
    pub fn set_size(&mut self, size: u8) -> &mut Self {
        assert!(size < 4, "Invalid map size: {}", size);
        self.0.set_bits(14..16, size as u16);
        self
    }
}
