use scanline_hal::RegisterAddress;

use crate::color::Color;
use crate::config::DISPLAY_HEIGHT;
use crate::hblank::handler::{DisplayTargets, HblankEffectHandler, TargetId};
use crate::resources::PaletteHandle;

/// Changes one color of a palette on every line, for gradients and fades.
///
/// The handler keeps the palette alive. Its target id is unused.
pub struct PaletteColorHandler {
    palette: PaletteHandle,
    color_index: usize,
}

impl PaletteColorHandler {
    pub fn new(palette: PaletteHandle, color_index: usize) -> Self {
        assert!(
            color_index < palette.colors_count(),
            "Invalid color index: {} - {}",
            color_index,
            palette.colors_count()
        );
        Self { palette, color_index }
    }

    pub fn palette(&self) -> &PaletteHandle {
        &self.palette
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }
}

impl HblankEffectHandler for PaletteColorHandler {
    type Input = Color;
    /// Bank offset of the driven color. Compaction moves it.
    type LastValue = usize;

    fn target_visible(&self, _target: TargetId, _targets: &dyn DisplayTargets) -> bool {
        true
    }

    fn setup_target(&mut self, _target: TargetId, _targets: &dyn DisplayTargets) -> usize {
        self.palette.color_offset(self.color_index)
    }

    fn target_updated(&mut self, _target: TargetId, last: &mut usize, _targets: &dyn DisplayTargets) -> bool {
        let offset = self.palette.color_offset(self.color_index);
        let updated = *last != offset;
        *last = offset;
        updated
    }

    fn output_register(&self, _target: TargetId, last: &usize, _targets: &dyn DisplayTargets) -> RegisterAddress {
        self.palette.handle().bank().address(*last)
    }

    fn write_output_values(&mut self, _target: TargetId, _last: &usize, input: &[Color], output: &mut [u16; DISPLAY_HEIGHT]) {
        for (out, color) in output.iter_mut().zip(input) {
            *out = color.raw();
        }
    }

    /// The stream left its last line's color in palette memory.
    fn cleanup(&mut self, _target: TargetId, _targets: &mut dyn DisplayTargets) {
        self.palette.rewrite_color(self.color_index);
    }
}
