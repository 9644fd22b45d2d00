use alloc::boxed::Box;

use crate::color::{self, Color};
use crate::config::{MAX_PALETTE_COLORS, PALETTE_COLORS};
use crate::error::Result;
use crate::memory::{BankId, VideoMemory};

use super::{Bpp, Content, Handle, Registry};

/// Colors to upload as one palette.
#[derive(Copy, Clone, Debug)]
pub struct PaletteItem<'a> {
    colors: &'a [Color],
    bpp: Bpp,
}

impl<'a> PaletteItem<'a> {
    /// 4bpp palettes have exactly 16 colors. 8bpp palettes have 16 to 256,
    /// in steps of 16.
    pub fn new(colors: &'a [Color], bpp: Bpp) -> Self {
        let count = colors.len();
        match bpp {
            Bpp::Four => assert!(count == PALETTE_COLORS, "Invalid colors count: {}", count),
            Bpp::Eight => assert!(
                count >= PALETTE_COLORS && count <= MAX_PALETTE_COLORS && count % PALETTE_COLORS == 0,
                "Invalid colors count: {}",
                count
            ),
        }
        Self { colors, bpp }
    }

    pub fn colors(&self) -> &'a [Color] {
        self.colors
    }

    pub fn bpp(&self) -> Bpp {
        self.bpp
    }

    fn content(&self) -> Content<'a> {
        Content::new(color::as_bytes(self.colors), self.bpp)
    }
}

/// A resident palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteHandle(Handle);

impl PaletteHandle {
    pub fn handle(&self) -> &Handle {
        &self.0
    }

    pub fn colors_count(&self) -> usize {
        self.0.len() / 2
    }

    pub fn bpp(&self) -> Bpp {
        self.0.bpp()
    }

    /// Palette bank index, in 16-color units.
    pub fn hw_index(&self) -> usize {
        self.0.hw_index()
    }

    /// Bank offset of color `index`.
    pub fn color_offset(&self, index: usize) -> usize {
        assert!(index < self.colors_count(), "Invalid color index: {} - {}", index, self.colors_count());
        self.0.offset() + index * 2
    }

    pub fn color(&self, index: usize) -> Color {
        assert!(index < self.colors_count(), "Invalid color index: {} - {}", index, self.colors_count());
        let mut colors = [Color::BLACK; MAX_PALETTE_COLORS];
        self.read_colors(&mut colors[..self.colors_count()]);
        colors[index]
    }

    /// Writes color `index` to its bank again, restoring it after something
    /// else wrote to that address.
    pub fn rewrite_color(&self, index: usize) {
        assert!(index < self.colors_count(), "Invalid color index: {} - {}", index, self.colors_count());
        self.0.rewrite(index * 2..index * 2 + 2);
    }

    /// Copies the current colors into `out`, which must not be longer than
    /// the palette.
    pub fn read_colors(&self, out: &mut [Color]) {
        self.0.read_bytes(bytemuck::cast_slice_mut(out));
    }

    /// Replaces all colors. The count must stay the same.
    pub fn set_colors(&self, colors: &[Color]) {
        assert!(colors.len() == self.colors_count(), "Invalid colors count: {} - {}", colors.len(), self.colors_count());
        self.0.set_bytes(color::as_bytes(colors));
    }

    /// Rewrites the colors through `effect`, for example
    /// `palette.apply(|colors| color_effect::fade(Color::BLACK, intensity, colors))`.
    pub fn apply(&self, effect: impl FnOnce(&mut [Color])) {
        let count = self.colors_count();
        let mut colors = [Color::BLACK; MAX_PALETTE_COLORS];
        self.read_colors(&mut colors[..count]);
        effect(&mut colors[..count]);
        self.set_colors(&colors[..count]);
    }
}

/// Palette registry of one palette bank.
#[derive(Clone)]
pub struct Palettes {
    registry: Registry,
}

impl Palettes {
    pub fn new(bank: BankId, memory: Box<dyn VideoMemory>) -> Self {
        assert!(bank.is_palette(), "Not a palette bank: {}", bank);
        Self { registry: Registry::new(bank, memory) }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn find(&self, item: &PaletteItem) -> Option<PaletteHandle> {
        self.registry.find(&item.content()).map(PaletteHandle)
    }

    pub fn create(&self, item: &PaletteItem) -> Result<PaletteHandle> {
        self.registry.create(&item.content()).map(PaletteHandle)
    }

    pub fn create_new(&self, item: &PaletteItem) -> Result<PaletteHandle> {
        self.registry.create_new(&item.content()).map(PaletteHandle)
    }

    pub fn create_optional(&self, item: &PaletteItem) -> Option<PaletteHandle> {
        self.registry.create_optional(&item.content()).map(PaletteHandle)
    }

    pub fn create_new_optional(&self, item: &PaletteItem) -> Option<PaletteHandle> {
        self.registry.create_new_optional(&item.content()).map(PaletteHandle)
    }

    pub fn release(&self, palette: PaletteHandle) {
        self.registry.release(palette.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_effect;
    use crate::fixed::Fixed;
    use crate::memory::RamBank;

    fn palettes() -> Palettes {
        Palettes::new(BankId::SpritePalettes, Box::new(RamBank::new(512)))
    }

    fn ramp() -> [Color; 16] {
        core::array::from_fn(|index| Color::new(index as u8, 0, 31 - index as u8))
    }

    #[test]
    fn test_create_and_read_back() {
        let palettes = palettes();
        let colors = ramp();
        let palette = palettes.create(&PaletteItem::new(&colors, Bpp::Four)).unwrap();
        assert_eq!(palette.colors_count(), 16);
        assert_eq!(palette.color(3), colors[3]);
        assert_eq!(palette.color_offset(3), 6);
        assert_eq!(palettes.find(&PaletteItem::new(&colors, Bpp::Four)), Some(palette));
    }

    #[test]
    fn test_apply_effect() {
        let palettes = palettes();
        let colors = ramp();
        let palette = palettes.create(&PaletteItem::new(&colors, Bpp::Four)).unwrap();
        palette.apply(|colors| color_effect::fade(Color::BLACK, Fixed::ONE, colors));
        assert!((0..16).all(|index| palette.color(index) == Color::BLACK));
        assert!(palettes.find(&PaletteItem::new(&colors, Bpp::Four)).is_none());
    }

    #[test]
    fn test_eight_bpp_counts() {
        let colors = [Color::WHITE; 48];
        let palettes = palettes();
        let palette = palettes.create(&PaletteItem::new(&colors, Bpp::Eight)).unwrap();
        assert_eq!(palette.colors_count(), 48);
        assert_eq!(palettes.registry().used_bytes(), 96);
    }

    #[test]
    #[should_panic(expected = "Invalid colors count")]
    fn test_four_bpp_needs_sixteen_colors() {
        let colors = [Color::WHITE; 32];
        PaletteItem::new(&colors, Bpp::Four);
    }

    #[test]
    #[should_panic(expected = "Invalid colors count")]
    fn test_eight_bpp_multiple_of_sixteen() {
        let colors = [Color::WHITE; 40];
        PaletteItem::new(&colors, Bpp::Eight);
    }
}
