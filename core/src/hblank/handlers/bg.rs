use scanline_hal::registers::{bg_control, bg_horizontal_offset, bg_vertical_offset};
use scanline_hal::window::Axis;
use scanline_hal::RegisterAddress;

use crate::config::DISPLAY_HEIGHT;
use crate::fixed::Fixed;
use crate::hblank::handler::{BgState, DisplayTargets, HblankEffectHandler, TargetId};

/// Hardware slot and state of a background, `None` while it is off screen.
pub type BgSnapshot = Option<(u8, BgState)>;

fn snapshot(target: TargetId, targets: &dyn DisplayTargets) -> BgSnapshot {
    targets.bg_hw_id(target).map(|hw_id| (hw_id, targets.bg_state(target)))
}

fn refresh(target: TargetId, last: &mut BgSnapshot, targets: &dyn DisplayTargets) -> bool {
    let current = snapshot(target, targets);
    let updated = *last != current;
    *last = current;
    updated
}

fn visible_snapshot(last: &BgSnapshot) -> (u8, BgState) {
    match last {
        Some(snapshot) => *snapshot,
        None => panic!("Background effect on a hidden background"),
    }
}

/// Per-line overrides of a background's control register.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BgAttributes {
    pub priority: u8,
    pub mosaic: bool,
    /// Map to read this line from, `None` keeps the background's own.
    pub screen_block: Option<u8>,
}

/// Rewrites `BGxCNT` on every line. The target id is the background.
///
/// Tiles, color depth and map size come from the background itself, so the
/// output is rebuilt when any of them changes.
#[derive(Default)]
pub struct BgAttributesHandler;

impl HblankEffectHandler for BgAttributesHandler {
    type Input = BgAttributes;
    type LastValue = BgSnapshot;

    fn target_visible(&self, target: TargetId, targets: &dyn DisplayTargets) -> bool {
        targets.bg_hw_id(target).is_some()
    }

    fn setup_target(&mut self, target: TargetId, targets: &dyn DisplayTargets) -> BgSnapshot {
        snapshot(target, targets)
    }

    fn target_updated(&mut self, target: TargetId, last: &mut BgSnapshot, targets: &dyn DisplayTargets) -> bool {
        refresh(target, last, targets)
    }

    fn output_register(&self, _target: TargetId, last: &BgSnapshot, _targets: &dyn DisplayTargets) -> RegisterAddress {
        bg_control(visible_snapshot(last).0)
    }

    fn write_output_values(
        &mut self,
        _target: TargetId,
        last: &BgSnapshot,
        input: &[BgAttributes],
        output: &mut [u16; DISPLAY_HEIGHT],
    ) {
        let (_, state) = visible_snapshot(last);
        for (out, attributes) in output.iter_mut().zip(input) {
            let mut control = state.control;
            control.set_priority(attributes.priority).set_mosaic(attributes.mosaic);
            if let Some(screen_block) = attributes.screen_block {
                control.set_screen_block(screen_block);
            }
            *out = control.0;
        }
    }

    fn cleanup(&mut self, _target: TargetId, targets: &mut dyn DisplayTargets) {
        targets.reload_bgs();
    }
}

/// Adds a per-line scroll delta to a background's horizontal or vertical
/// offset. The target id is the background.
pub struct BgPositionHandler {
    axis: Axis,
}

impl BgPositionHandler {
    pub fn horizontal() -> Self {
        Self { axis: Axis::Horizontal }
    }

    pub fn vertical() -> Self {
        Self { axis: Axis::Vertical }
    }
}

impl HblankEffectHandler for BgPositionHandler {
    type Input = Fixed;
    type LastValue = BgSnapshot;

    fn target_visible(&self, target: TargetId, targets: &dyn DisplayTargets) -> bool {
        targets.bg_hw_id(target).is_some()
    }

    fn setup_target(&mut self, target: TargetId, targets: &dyn DisplayTargets) -> BgSnapshot {
        snapshot(target, targets)
    }

    fn target_updated(&mut self, target: TargetId, last: &mut BgSnapshot, targets: &dyn DisplayTargets) -> bool {
        refresh(target, last, targets)
    }

    fn output_register(&self, _target: TargetId, last: &BgSnapshot, _targets: &dyn DisplayTargets) -> RegisterAddress {
        let hw_id = visible_snapshot(last).0;
        match self.axis {
            Axis::Horizontal => bg_horizontal_offset(hw_id),
            Axis::Vertical => bg_vertical_offset(hw_id),
        }
    }

    fn write_output_values(&mut self, _target: TargetId, last: &BgSnapshot, input: &[Fixed], output: &mut [u16; DISPLAY_HEIGHT]) {
        let (_, state) = visible_snapshot(last);
        let base = match self.axis {
            Axis::Horizontal => state.horizontal_offset,
            Axis::Vertical => state.vertical_offset,
        } as i32;
        for (out, delta) in output.iter_mut().zip(input) {
            // Scroll registers are 9 bits wide.
            *out = ((base + delta.integer()) & 0x1FF) as u16;
        }
    }

    fn cleanup(&mut self, _target: TargetId, targets: &mut dyn DisplayTargets) {
        targets.reload_bgs();
    }
}
