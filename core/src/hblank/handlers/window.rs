use scanline_hal::registers::{window_horizontal, window_vertical};
use scanline_hal::window::{pack_boundaries, Axis};
use scanline_hal::RegisterAddress;

use crate::config::DISPLAY_HEIGHT;
use crate::fixed::Fixed;
use crate::hblank::handler::{DisplayTargets, HblankEffectHandler, TargetId};

/// Moves the boundaries of a rect window line by line. The target id is the
/// window number.
///
/// Each input is a `(start, end)` delta added to the window's own boundaries,
/// so a circle or a wave can be drawn with a window that stays put.
pub struct RectWindowBoundariesHandler {
    axis: Axis,
}

impl RectWindowBoundariesHandler {
    pub fn horizontal() -> Self {
        Self { axis: Axis::Horizontal }
    }

    pub fn vertical() -> Self {
        Self { axis: Axis::Vertical }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }
}

fn window_id(target: TargetId) -> u8 {
    assert!(target.0 < 2, "Invalid rect window id: {}", target.0);
    target.0 as u8
}

impl HblankEffectHandler for RectWindowBoundariesHandler {
    type Input = (Fixed, Fixed);
    type LastValue = (i32, i32);

    fn target_visible(&self, _target: TargetId, _targets: &dyn DisplayTargets) -> bool {
        true
    }

    fn setup_target(&mut self, target: TargetId, targets: &dyn DisplayTargets) -> (i32, i32) {
        targets.rect_window_boundaries(window_id(target), self.axis)
    }

    fn target_updated(&mut self, target: TargetId, last: &mut (i32, i32), targets: &dyn DisplayTargets) -> bool {
        let boundaries = targets.rect_window_boundaries(window_id(target), self.axis);
        let updated = *last != boundaries;
        *last = boundaries;
        updated
    }

    fn output_register(&self, target: TargetId, _last: &(i32, i32), _targets: &dyn DisplayTargets) -> RegisterAddress {
        match self.axis {
            Axis::Horizontal => window_horizontal(window_id(target)),
            Axis::Vertical => window_vertical(window_id(target)),
        }
    }

    fn write_output_values(
        &mut self,
        _target: TargetId,
        last: &(i32, i32),
        input: &[(Fixed, Fixed)],
        output: &mut [u16; DISPLAY_HEIGHT],
    ) {
        let (start, end) = *last;
        for (out, (start_delta, end_delta)) in output.iter_mut().zip(input) {
            *out = pack_boundaries(self.axis, start + start_delta.integer(), end + end_delta.integer());
        }
    }

    fn cleanup(&mut self, _target: TargetId, targets: &mut dyn DisplayTargets) {
        targets.reload_windows();
    }
}
