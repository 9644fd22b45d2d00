use scanline_hal::bg::BgControl;
use scanline_hal::mosaic::Mosaic;
use scanline_hal::oam::ObjAttributes;
use scanline_hal::window::Axis;
use scanline_hal::RegisterAddress;

use crate::config::DISPLAY_HEIGHT;

/// Opaque id of the object an effect is attached to: a window, a background
/// or a sprite, depending on the handler.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

/// Hardware-facing state of one background.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BgState {
    /// Current `BGxCNT` contents.
    pub control: BgControl,
    /// Current scroll registers.
    pub horizontal_offset: u16,
    pub vertical_offset: u16,
}

/// The visual subsystems effects are attached to.
///
/// Queries report what is currently committed to hardware. The reload hooks
/// ask a subsystem to rewrite its registers on the next commit, which is how
/// a register goes back to normal control after an effect stops driving it.
pub trait DisplayTargets {
    /// Hardware `(start, end)` boundaries of rect window `window`.
    fn rect_window_boundaries(&self, window: u8, axis: Axis) -> (i32, i32);

    /// Hardware slot of `bg`, `None` while it is not on screen.
    fn bg_hw_id(&self, bg: TargetId) -> Option<u8>;

    fn bg_state(&self, bg: TargetId) -> BgState;

    /// Hardware slot of `sprite`, `None` while it is hidden or culled.
    fn sprite_hw_id(&self, sprite: TargetId) -> Option<u8>;

    fn sprite_attributes(&self, sprite: TargetId) -> ObjAttributes;

    fn mosaic(&self) -> Mosaic;

    fn reload_windows(&mut self) {}

    fn reload_bgs(&mut self) {}

    fn reload_sprites(&mut self) {}

    fn reload_mosaic(&mut self) {}
}

/// One kind of per-scanline effect.
///
/// The scheduler drives every handler through the same cycle:
///
/// 1. [`setup_target`](Self::setup_target) once, when the effect is created.
/// 2. Every frame the effect is shown: [`target_visible`](Self::target_visible)
///    and, if true, [`target_updated`](Self::target_updated).
/// 3. When the target changed, the input table was reloaded or the effect
///    was just shown: [`write_output_values`](Self::write_output_values).
/// 4. [`cleanup`](Self::cleanup) once, when the effect is removed.
pub trait HblankEffectHandler: 'static {
    /// One line of the caller's input table.
    type Input: Copy + 'static;

    /// Cached target state, compared frame to frame.
    type LastValue: 'static;

    /// False while the target is not on screen. The effect is skipped.
    fn target_visible(&self, target: TargetId, targets: &dyn DisplayTargets) -> bool;

    fn setup_target(&mut self, target: TargetId, targets: &dyn DisplayTargets) -> Self::LastValue;

    /// Refreshes `last` and returns true if the output has to be rebuilt even
    /// though the input table did not change.
    fn target_updated(&mut self, target: TargetId, last: &mut Self::LastValue, targets: &dyn DisplayTargets) -> bool;

    /// Register fed from the output table. Only called on visible targets.
    fn output_register(&self, target: TargetId, last: &Self::LastValue, targets: &dyn DisplayTargets) -> RegisterAddress;

    /// Encodes one register value per line.
    fn write_output_values(
        &mut self,
        target: TargetId,
        last: &Self::LastValue,
        input: &[Self::Input],
        output: &mut [u16; DISPLAY_HEIGHT],
    );

    /// The effect starts being shown.
    fn show(&mut self, _target: TargetId, _targets: &mut dyn DisplayTargets) {}

    /// The effect was removed.
    fn cleanup(&mut self, _target: TargetId, _targets: &mut dyn DisplayTargets) {}
}
