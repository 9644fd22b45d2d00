//! # Object Attribute Memory
//!
//! OAM at `$0700_0000` holds 128 sprites of four half-words each. The fourth
//! word of each entry is part of the affine matrices and is not touched here.
//!
//! ```text
//! attr0: 15-14 shape | 13 8bpp | 12 mosaic | 11-10 mode | 9-8 affine | 7-0 y
//! attr1: 15-14 size  | 13 vflip | 12 hflip | 8-0 x
//! attr2: 15-12 palette | 11-10 priority | 9-0 tile
//! ```

use bit_field::BitField;

use crate::registers::RegisterAddress;

pub const OAM_BASE: u32 = 0x0700_0000;

/// Number of hardware sprite slots.
pub const SPRITES: usize = 128;

/// Bytes between two OAM entries.
const ENTRY_SIZE: u32 = 8;

/// Which attribute word of an entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttributeWord {
    First = 0,
    Second = 1,
    Third = 2,
}

/// Address of one attribute word of hardware sprite `hw_id`.
pub fn attribute_register(hw_id: u8, word: AttributeWord) -> RegisterAddress {
    assert!((hw_id as usize) < SPRITES, "Invalid sprite hw id: {}", hw_id);
    RegisterAddress::new(OAM_BASE + hw_id as u32 * ENTRY_SIZE + word as u32 * 2)
}

/// The three attribute words of one sprite.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjAttributes {
    pub attr0: u16,
    pub attr1: u16,
    pub attr2: u16,
}

impl ObjAttributes {
    pub fn word(&self, word: AttributeWord) -> u16 {
        match word {
            AttributeWord::First => self.attr0,
            AttributeWord::Second => self.attr1,
            AttributeWord::Third => self.attr2,
        }
    }

    #[inline]
    pub fn y(&self) -> u8 {
        self.attr0.get_bits(0..8) as u8
    }

    /// Screen y, wrapped to the 8-bit hardware field.
    #[inline]
    pub fn set_y(&mut self, y: i32) -> &mut Self {
        self.attr0.set_bits(0..8, (y & 0xFF) as u16);
        self
    }

    #[inline]
    pub fn x(&self) -> u16 {
        self.attr1.get_bits(0..9)
    }

    /// Screen x, wrapped to the 9-bit hardware field.
    #[inline]
    pub fn set_x(&mut self, x: i32) -> &mut Self {
        self.attr1.set_bits(0..9, (x & 0x1FF) as u16);
        self
    }

    #[inline]
    pub fn tile(&self) -> u16 {
        self.attr2.get_bits(0..10)
    }

    #[inline]
    pub fn set_tile(&mut self, tile: u16) -> &mut Self {
        assert!(tile < 1024, "Invalid tile index: {}", tile);
        self.attr2.set_bits(0..10, tile);
        self
    }

    #[inline]
    pub fn priority(&self) -> u8 {
        self.attr2.get_bits(10..12) as u8
    }

    #[inline]
    pub fn set_priority(&mut self, priority: u8) -> &mut Self {
        assert!(priority < 4, "Invalid priority: {}", priority);
        self.attr2.set_bits(10..12, priority as u16);
        self
    }

    #[inline]
    pub fn palette(&self) -> u8 {
        self.attr2.get_bits(12..16) as u8
    }

    #[inline]
    pub fn set_palette(&mut self, palette: u8) -> &mut Self {
        assert!(palette < 16, "Invalid palette id: {}", palette);
        self.attr2.set_bits(12..16, palette as u16);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_register() {
        assert_eq!(attribute_register(0, AttributeWord::First).get(), 0x0700_0000);
        assert_eq!(attribute_register(1, AttributeWord::Second).get(), 0x0700_000A);
        assert_eq!(attribute_register(127, AttributeWord::Third).get(), 0x0700_03FC);
    }

    #[test]
    fn test_position_wraps() {
        let mut attributes = ObjAttributes { attr0: 0xC000, attr1: 0xF000, attr2: 0 };
        attributes.set_x(-1).set_y(-2);
        assert_eq!(attributes.x(), 0x1FF);
        assert_eq!(attributes.y(), 0xFE);
        assert_eq!(attributes.attr0 & 0xFF00, 0xC000);
        assert_eq!(attributes.attr1 & 0xFE00, 0xF000);
    }

    #[test]
    fn test_third_attribute() {
        let mut attributes = ObjAttributes::default();
        attributes.set_tile(513).set_priority(3).set_palette(15);
        assert_eq!(attributes.tile(), 513);
        assert_eq!(attributes.priority(), 3);
        assert_eq!(attributes.palette(), 15);
        assert_eq!(attributes.word(AttributeWord::Third), 0xFE01);
    }
}
