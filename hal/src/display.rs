//! # Display Geometry & Control Flags
//!
//! ## Timing
//!
//! ```text
//!       |<------- 240px ------->|<-68->|
//!      _ ______________________________
//!     ^ |                       |      |
//! 160px |        hdraw          |hblank|
//!     v_|_______________________|______|
//!     ^ |                              |
//!  68px |           vblank             |
//!     v_|______________________________|
//! ```
//!
//! Line `n + 1` can be prepared during the horizontal blank of line `n`.
//! Line 0 is prepared during the horizontal blank of the last vblank line.
//!
//! ## DisplayControl (`DISPCNT`)
//!
//! | Flag             | Effect                                      |
//! |------------------|---------------------------------------------|
//! | `BG0`..`BG3`     | Show the background layer                   |
//! | `OBJ`            | Show sprites                                |
//! | `WIN0`, `WIN1`   | Enable the rectangular windows              |
//! | `OBJ_WIN`        | Enable the sprite window                    |
//! | `FORCED_BLANK`   | Blank the screen, full-speed VRAM access    |

/// Visible pixels per scanline.
pub const WIDTH: usize = 240;

/// Visible scanlines per frame. Line tables have exactly this many entries.
pub const HEIGHT: usize = 160;

/// Total scanlines per frame, vertical blank included.
pub const TOTAL_LINES: usize = 228;

/// Last scanline of the vertical blank; its HBlank prepares line 0.
pub const LAST_LINE: u16 = (TOTAL_LINES - 1) as u16;

/// Returns the visible line whose register values must be written during the
/// HBlank of `vcount`, or `None` when the next line is not visible.
#[inline(always)]
pub const fn next_visible_line(vcount: u16) -> Option<usize> {
    let next = if vcount >= LAST_LINE { 0 } else { vcount as usize + 1 };
    if next < HEIGHT { Some(next) } else { None }
}

bitflags::bitflags! {
    /// Display control flags at `DISPCNT`.
    ///
    /// Bits 0-2 hold the video mode; only the tiled modes (0-2) are used.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct DisplayControl: u16 {
        const MODE_1          = 0b0000_0000_0000_0001;
        const MODE_2          = 0b0000_0000_0000_0010;
        /// One-dimensional sprite tile mapping.
        const OBJ_1D          = 0b0000_0000_0100_0000;
        const FORCED_BLANK    = 0b0000_0000_1000_0000;
        const BG0             = 0b0000_0001_0000_0000;
        const BG1             = 0b0000_0010_0000_0000;
        const BG2             = 0b0000_0100_0000_0000;
        const BG3             = 0b0000_1000_0000_0000;
        const OBJ             = 0b0001_0000_0000_0000;
        const WIN0            = 0b0010_0000_0000_0000;
        const WIN1            = 0b0100_0000_0000_0000;
        const OBJ_WIN         = 0b1000_0000_0000_0000;
    }

    /// Display status flags at `DISPSTAT`.
    ///
    /// The upper byte holds the VCOUNT match line.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct DisplayStatus: u16 {
        /// Read only: inside the vertical blank.
        const IN_VBLANK       = 0b0000_0000_0000_0001;
        /// Read only: inside a horizontal blank.
        const IN_HBLANK       = 0b0000_0000_0000_0010;
        /// Read only: VCOUNT matches the configured line.
        const VCOUNT_MATCH    = 0b0000_0000_0000_0100;
        const VBLANK_IRQ      = 0b0000_0000_0000_1000;
        const HBLANK_IRQ      = 0b0000_0000_0001_0000;
        const VCOUNT_IRQ      = 0b0000_0000_0010_0000;
    }
}

impl DisplayControl {
    /// The flag that shows background layer `id` (0-3).
    pub fn bg(id: u8) -> DisplayControl {
        assert!(id < 4, "Invalid background id: {}", id);
        DisplayControl::from_bits_truncate(DisplayControl::BG0.bits() << id)
    }
}
