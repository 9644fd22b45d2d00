use scanline_hal::oam::{attribute_register, AttributeWord, ObjAttributes};
use scanline_hal::window::Axis;
use scanline_hal::RegisterAddress;

use crate::config::DISPLAY_HEIGHT;
use crate::fixed::Fixed;
use crate::hblank::handler::{DisplayTargets, HblankEffectHandler, TargetId};

/// Hardware slot and attributes of a sprite, `None` while it is hidden.
pub type SpriteSnapshot = Option<(u8, ObjAttributes)>;

fn snapshot(target: TargetId, targets: &dyn DisplayTargets) -> SpriteSnapshot {
    targets.sprite_hw_id(target).map(|hw_id| (hw_id, targets.sprite_attributes(target)))
}

fn visible_snapshot(last: &SpriteSnapshot) -> (u8, ObjAttributes) {
    match last {
        Some(snapshot) => *snapshot,
        None => panic!("Sprite effect on a hidden sprite"),
    }
}

/// Adds a per-line delta to a sprite's x or y. The target id is the sprite.
///
/// Sprites get a new hardware slot whenever the sorted sprite list changes,
/// so the output register follows the slot.
pub struct SpritePositionHandler {
    axis: Axis,
}

impl SpritePositionHandler {
    pub fn horizontal() -> Self {
        Self { axis: Axis::Horizontal }
    }

    pub fn vertical() -> Self {
        Self { axis: Axis::Vertical }
    }
}

impl HblankEffectHandler for SpritePositionHandler {
    type Input = Fixed;
    type LastValue = SpriteSnapshot;

    fn target_visible(&self, target: TargetId, targets: &dyn DisplayTargets) -> bool {
        targets.sprite_hw_id(target).is_some()
    }

    fn setup_target(&mut self, target: TargetId, targets: &dyn DisplayTargets) -> SpriteSnapshot {
        snapshot(target, targets)
    }

    fn target_updated(&mut self, target: TargetId, last: &mut SpriteSnapshot, targets: &dyn DisplayTargets) -> bool {
        let current = snapshot(target, targets);
        let updated = *last != current;
        *last = current;
        updated
    }

    fn output_register(&self, _target: TargetId, last: &SpriteSnapshot, _targets: &dyn DisplayTargets) -> RegisterAddress {
        let (hw_id, _) = visible_snapshot(last);
        match self.axis {
            Axis::Horizontal => attribute_register(hw_id, AttributeWord::Second),
            Axis::Vertical => attribute_register(hw_id, AttributeWord::First),
        }
    }

    fn write_output_values(
        &mut self,
        _target: TargetId,
        last: &SpriteSnapshot,
        input: &[Fixed],
        output: &mut [u16; DISPLAY_HEIGHT],
    ) {
        let (_, attributes) = visible_snapshot(last);
        for (out, delta) in output.iter_mut().zip(input) {
            let mut line = attributes;
            *out = match self.axis {
                Axis::Horizontal => line.set_x(attributes.x() as i32 + delta.integer()).attr1,
                Axis::Vertical => line.set_y(attributes.y() as i32 + delta.integer()).attr0,
            };
        }
    }

    fn cleanup(&mut self, _target: TargetId, targets: &mut dyn DisplayTargets) {
        targets.reload_sprites();
    }
}

/// Per-line contents of a sprite's third attribute word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteTileAttributes {
    pub tile: u16,
    pub palette: u8,
    pub priority: u8,
}

impl From<ObjAttributes> for SpriteTileAttributes {
    fn from(attributes: ObjAttributes) -> Self {
        Self { tile: attributes.tile(), palette: attributes.palette(), priority: attributes.priority() }
    }
}

/// Switches a sprite's tiles, palette and priority line by line, for example
/// to show a different animation frame on each half of the sprite.
#[derive(Default)]
pub struct SpriteTileAttributesHandler;

impl HblankEffectHandler for SpriteTileAttributesHandler {
    type Input = SpriteTileAttributes;
    type LastValue = Option<u8>;

    fn target_visible(&self, target: TargetId, targets: &dyn DisplayTargets) -> bool {
        targets.sprite_hw_id(target).is_some()
    }

    fn setup_target(&mut self, target: TargetId, targets: &dyn DisplayTargets) -> Option<u8> {
        targets.sprite_hw_id(target)
    }

    fn target_updated(&mut self, target: TargetId, last: &mut Option<u8>, targets: &dyn DisplayTargets) -> bool {
        let current = targets.sprite_hw_id(target);
        let updated = *last != current;
        *last = current;
        updated
    }

    fn output_register(&self, _target: TargetId, last: &Option<u8>, _targets: &dyn DisplayTargets) -> RegisterAddress {
        match last {
            Some(hw_id) => attribute_register(*hw_id, AttributeWord::Third),
            None => panic!("Sprite effect on a hidden sprite"),
        }
    }

    fn write_output_values(
        &mut self,
        _target: TargetId,
        _last: &Option<u8>,
        input: &[SpriteTileAttributes],
        output: &mut [u16; DISPLAY_HEIGHT],
    ) {
        for (out, line) in output.iter_mut().zip(input) {
            let mut attributes = ObjAttributes::default();
            attributes.set_tile(line.tile).set_palette(line.palette).set_priority(line.priority);
            *out = attributes.attr2;
        }
    }

    fn cleanup(&mut self, _target: TargetId, targets: &mut dyn DisplayTargets) {
        targets.reload_sprites();
    }
}
