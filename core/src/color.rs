use bitfield::bitfield;
use bytemuck::{Pod, Zeroable};

/// Largest value of a single color channel.
pub const CHANNEL_MAX: u8 = 31;

bitfield! {
    /// 15-bit BGR color as stored in palette memory. Bit 15 is ignored.
    #[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
    #[repr(transparent)]
    pub struct Color(u16);
    impl Debug;
    pub u8, red, set_red: 4, 0;
    pub u8, green, set_green: 9, 5;
    pub u8, blue, set_blue: 14, 10;
}

impl Color {
    pub const BLACK: Color = Color(0);
    pub const WHITE: Color = Color(0x7FFF);

    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        assert!(red <= CHANNEL_MAX, "Invalid red: {}", red);
        assert!(green <= CHANNEL_MAX, "Invalid green: {}", green);
        assert!(blue <= CHANNEL_MAX, "Invalid blue: {}", blue);
        Self::from_channels([red, green, blue])
    }

    #[inline(always)]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw & 0x7FFF)
    }

    #[inline(always)]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn channels(self) -> [u8; 3] {
        [self.red(), self.green(), self.blue()]
    }

    #[inline]
    pub(crate) fn from_channels([red, green, blue]: [u8; 3]) -> Self {
        let mut color = Color(0);
        color.set_red(red);
        color.set_green(green);
        color.set_blue(blue);
        color
    }
}

/// Palette bytes of `colors`, little endian like the hardware.
pub fn as_bytes(colors: &[Color]) -> &[u8] {
    bytemuck::cast_slice(colors)
}
