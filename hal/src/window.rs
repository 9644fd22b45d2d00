//! # Rectangular Window Boundaries
//!
//! `WINxH` and `WINxV` each pack a `(start << 8) | end` pair. `end` is
//! exclusive. Values past the screen edge confuse the hardware (the window
//! wraps around), so boundaries are clamped before packing.

use crate::display::{HEIGHT, WIDTH};

/// Which pair of boundaries a window register holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Left and right, written to `WINxH`.
    Horizontal,
    /// Top and bottom, written to `WINxV`.
    Vertical,
}

impl Axis {
    /// Screen extent along this axis.
    pub const fn limit(self) -> i32 {
        match self {
            Axis::Horizontal => WIDTH as i32,
            Axis::Vertical => HEIGHT as i32,
        }
    }
}

/// Packs a boundary pair for `axis`, clamped to the screen. An inverted pair
/// collapses into an empty window.
#[inline]
pub fn pack_boundaries(axis: Axis, start: i32, end: i32) -> u16 {
    let limit = axis.limit();
    let start = start.clamp(0, limit);
    let end = end.clamp(start, limit);
    ((start as u16) << 8) | end as u16
}

/// Inverse of [`pack_boundaries`].
#[inline]
pub fn unpack_boundaries(value: u16) -> (i32, i32) {
    ((value >> 8) as i32, (value & 0xFF) as i32)
}
