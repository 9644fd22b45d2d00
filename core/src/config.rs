//! Compile-time limits.

pub use scanline_hal::display::HEIGHT as DISPLAY_HEIGHT;
pub use scanline_hal::memory::GRANULARITY;

/// Maximum number of simultaneous hblank effects. Every active effect costs
/// one register write per scanline inside the HBlank interrupt, so this is
/// bounded by how many writes fit in one horizontal blank.
#[cfg(feature = "max-hblank-effects-16")]
pub const MAX_HBLANK_EFFECTS: usize = 16;

#[cfg(not(feature = "max-hblank-effects-16"))]
pub const MAX_HBLANK_EFFECTS: usize = 8;

/// Colors in one 4bpp palette.
pub const PALETTE_COLORS: usize = 16;

/// Colors in a full palette bank.
pub const MAX_PALETTE_COLORS: usize = 256;
