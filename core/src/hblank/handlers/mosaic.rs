use scanline_hal::mosaic::{Mosaic, MosaicField};
use scanline_hal::registers::MOSAIC;
use scanline_hal::RegisterAddress;

use crate::config::DISPLAY_HEIGHT;
use crate::fixed::Fixed;
use crate::hblank::handler::{DisplayTargets, HblankEffectHandler, TargetId};

/// Changes one mosaic block size on every line. Input stretches are in
/// `[0, 1]`, `1` being the largest block. The target id is unused.
///
/// The other three fields keep their current values.
pub struct MosaicStretchHandler {
    field: MosaicField,
}

impl MosaicStretchHandler {
    pub fn new(field: MosaicField) -> Self {
        Self { field }
    }
}

/// Hardware nibble for `stretch`.
pub fn stretch_value(stretch: Fixed) -> u8 {
    assert!(stretch.is_unit(), "Invalid stretch: {:?}", stretch);
    stretch.to_precision(4).min(15) as u8
}

impl HblankEffectHandler for MosaicStretchHandler {
    type Input = Fixed;
    type LastValue = Mosaic;

    fn target_visible(&self, _target: TargetId, _targets: &dyn DisplayTargets) -> bool {
        true
    }

    fn setup_target(&mut self, _target: TargetId, targets: &dyn DisplayTargets) -> Mosaic {
        targets.mosaic()
    }

    fn target_updated(&mut self, _target: TargetId, last: &mut Mosaic, targets: &dyn DisplayTargets) -> bool {
        let current = targets.mosaic();
        let updated = *last != current;
        *last = current;
        updated
    }

    fn output_register(&self, _target: TargetId, _last: &Mosaic, _targets: &dyn DisplayTargets) -> RegisterAddress {
        MOSAIC
    }

    fn write_output_values(&mut self, _target: TargetId, last: &Mosaic, input: &[Fixed], output: &mut [u16; DISPLAY_HEIGHT]) {
        for (out, stretch) in output.iter_mut().zip(input) {
            let mut mosaic = *last;
            *out = mosaic.set(self.field, stretch_value(*stretch)).0;
        }
    }

    fn cleanup(&mut self, _target: TargetId, targets: &mut dyn DisplayTargets) {
        targets.reload_mosaic();
    }
}
