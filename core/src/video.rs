use alloc::boxed::Box;

use log::trace;
use scanline_hal::hblank::HblankStream;

use crate::hblank::{DisplayTargets, HblankEffects};
use crate::memory::{BankId, MmioBank, ShadowBank, VideoMemory};
use crate::resources::{Palettes, Registry, Tiles};

/// Every piece of video state that lives for the whole program.
///
/// Create one at start-up and pass it around. Each frame:
///
/// ```ignore
/// // game logic: create and drop handles, edit effect tables
/// video.update(&mut scene);
/// wait_for_vblank();
/// unsafe { video.commit(&mut STREAM) };
/// ```
pub struct VideoCore {
    pub bg_palettes: Palettes,
    pub sprite_palettes: Palettes,
    pub bg_tiles: Tiles,
    pub sprite_tiles: Tiles,
    pub hblank_effects: HblankEffects,
}

impl VideoCore {
    /// Builds the registries on the banks returned by `memory`.
    pub fn new(mut memory: impl FnMut(BankId) -> Box<dyn VideoMemory>) -> Self {
        Self {
            bg_palettes: Palettes::new(BankId::BgPalettes, memory(BankId::BgPalettes)),
            sprite_palettes: Palettes::new(BankId::SpritePalettes, memory(BankId::SpritePalettes)),
            bg_tiles: Tiles::new(BankId::BgTiles, memory(BankId::BgTiles)),
            sprite_tiles: Tiles::new(BankId::SpriteTiles, memory(BankId::SpriteTiles)),
            hblank_effects: HblankEffects::new(),
        }
    }

    /// Video memory banks shadowed in RAM and flushed on commit.
    ///
    /// # Safety
    /// Target only, and only once.
    pub unsafe fn hardware() -> Self {
        Self::new(|bank| -> Box<dyn VideoMemory> { Box::new(ShadowBank::new(unsafe { MmioBank::new(bank) })) })
    }

    pub fn registry(&self, bank: BankId) -> &Registry {
        match bank {
            BankId::BgPalettes => self.bg_palettes.registry(),
            BankId::SpritePalettes => self.sprite_palettes.registry(),
            BankId::BgTiles => self.bg_tiles.registry(),
            BankId::SpriteTiles => self.sprite_tiles.registry(),
        }
    }

    /// Frame work outside vertical blank. Returns how many effects were
    /// recomputed.
    pub fn update(&mut self, targets: &mut dyn DisplayTargets) -> usize {
        self.hblank_effects.update(targets)
    }

    /// Vertical blank work: uploads modified bank contents, swaps the effect
    /// tables and points `stream` at them. Returns the streamed effects count.
    ///
    /// # Safety
    /// Same contract as [`HblankEffects::load_stream`].
    pub unsafe fn commit<const N: usize>(&mut self, stream: &mut HblankStream<N>) -> usize {
        for bank in BankId::ALL {
            self.registry(bank).flush();
        }
        let streamed = self.hblank_effects.commit();
        unsafe { self.hblank_effects.load_stream(stream) };
        trace!(target: "video", "committed, {} hblank effects streamed", streamed);
        streamed
    }

    pub fn log_status(&self) {
        for bank in BankId::ALL {
            self.registry(bank).log_status();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::memory::RamBank;
    use crate::resources::{Bpp, PaletteItem};

    #[test]
    fn test_banks_are_independent() {
        let video = VideoCore::new(|bank| -> Box<dyn VideoMemory> { Box::new(RamBank::new(bank.size())) });
        let colors = [Color::WHITE; 16];
        let item = PaletteItem::new(&colors, Bpp::Four);
        let bg = video.bg_palettes.create(&item).unwrap();
        let sprite = video.sprite_palettes.create(&item).unwrap();
        assert_ne!(bg.handle(), sprite.handle());
        assert_eq!(bg.handle().offset(), 0);
        assert_eq!(sprite.handle().offset(), 0);
        assert_eq!(video.registry(BankId::BgPalettes).used_bytes(), 32);
        assert_eq!(video.registry(BankId::BgTiles).used_bytes(), 0);
        assert_eq!(video.registry(BankId::SpriteTiles).bank(), BankId::SpriteTiles);
    }
}
