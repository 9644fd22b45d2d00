//! # Per-Scanline Effects
//!
//! An effect drives one hardware register with a different value on every
//! visible line. The caller owns the input table ([`LineValues`]), a
//! [`HblankEffectHandler`] turns it into register values, and
//! [`HblankEffects`] decides once per frame which outputs need rebuilding.
//!
//! | Handler | Register | Input |
//! |---------|----------|-------|
//! | [`PaletteColorHandler`] | one palette color | [`Color`](crate::color::Color) |
//! | [`RectWindowBoundariesHandler`] | `WINxH` / `WINxV` | `(Fixed, Fixed)` delta |
//! | [`BgAttributesHandler`] | `BGxCNT` | [`BgAttributes`] |
//! | [`BgPositionHandler`] | `BGxHOFS` / `BGxVOFS` | `Fixed` delta |
//! | [`SpritePositionHandler`] | OAM attribute 0 or 1 | `Fixed` delta |
//! | [`SpriteTileAttributesHandler`] | OAM attribute 2 | [`SpriteTileAttributes`] |
//! | [`MosaicStretchHandler`] | `MOSAIC` | `Fixed` stretch |
//!
//! ```ignore
//! let gradient = LineValues::from_fn(|line| Color::new(0, 0, (line / 6) as u8));
//! let id = effects.create(PaletteColorHandler::new(palette, 0), TargetId(0), gradient.clone(), &targets)?;
//!
//! // every frame
//! effects.update(&mut targets);
//! // vertical blank
//! effects.commit();
//! unsafe { effects.load_stream(&mut STREAM) };
//! ```

mod handler;
mod line_table;
mod scheduler;

pub mod handlers;

pub use handler::{BgState, DisplayTargets, HblankEffectHandler, TargetId};
pub use handlers::*;
pub use line_table::{LineTables, LineValues};
pub use scheduler::{HblankEffectId, HblankEffects};
