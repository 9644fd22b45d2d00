//! # Mosaic (`MOSAIC`)
//!
//! Four 4-bit block sizes, each stored minus one:
//!
//! ```text
//!  15-12      | 11-8       | 7-4       | 3-0
//!  sprites v  | sprites h  | bgs v     | bgs h
//! ```

use bit_field::BitField;

/// One of the four mosaic nibbles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MosaicField {
    BgsHorizontal,
    BgsVertical,
    SpritesHorizontal,
    SpritesVertical,
}

impl MosaicField {
    #[inline(always)]
    const fn shift(self) -> usize {
        match self {
            MosaicField::BgsHorizontal => 0,
            MosaicField::BgsVertical => 4,
            MosaicField::SpritesHorizontal => 8,
            MosaicField::SpritesVertical => 12,
        }
    }
}

/// Shadow copy of the write-only mosaic register.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Mosaic(pub u16);

impl Mosaic {
    /// Block size minus one, 0-15.
    #[inline]
    pub fn get(&self, field: MosaicField) -> u8 {
        let shift = field.shift();
        self.0.get_bits(shift..shift + 4) as u8
    }

    #[inline]
    pub fn set(&mut self, field: MosaicField, value: u8) -> &mut Self {
        assert!(value < 16, "Invalid mosaic value: {}", value);
        let shift = field.shift();
        self.0.set_bits(shift..shift + 4, value as u16);
        self
    }
}
