//! Built-in effect handlers.

mod bg;
mod color;
mod mosaic;
mod sprite;
mod window;

pub use bg::{BgAttributes, BgAttributesHandler, BgPositionHandler, BgSnapshot};
pub use color::PaletteColorHandler;
pub use mosaic::{stretch_value, MosaicStretchHandler};
pub use sprite::{SpritePositionHandler, SpriteSnapshot, SpriteTileAttributes, SpriteTileAttributesHandler};
pub use window::RectWindowBoundariesHandler;

#[cfg(test)]
mod tests;
