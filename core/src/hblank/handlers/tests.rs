use alloc::boxed::Box;

use scanline_hal::bg::BgControl;
use scanline_hal::mosaic::{Mosaic, MosaicField};
use scanline_hal::oam::{attribute_register, AttributeWord, ObjAttributes};
use scanline_hal::registers::{bg_control, bg_horizontal_offset, window_horizontal, MOSAIC};
use scanline_hal::window::Axis;
use scanline_hal::RegisterAddress;

use super::*;
use crate::color::Color;
use crate::config::DISPLAY_HEIGHT;
use crate::fixed::Fixed;
use crate::hblank::{BgState, DisplayTargets, HblankEffectHandler, HblankEffects, LineValues, TargetId};
use crate::memory::{BankId, RamBank};
use crate::resources::{Bpp, PaletteItem, Palettes};

#[derive(Default)]
struct FakeTargets {
    windows: [[(i32, i32); 2]; 2],
    bgs: [Option<(u8, BgState)>; 4],
    sprites: [Option<(u8, ObjAttributes)>; 4],
    mosaic: Mosaic,
    window_reloads: u32,
    bg_reloads: u32,
    sprite_reloads: u32,
    mosaic_reloads: u32,
}

impl DisplayTargets for FakeTargets {
    fn rect_window_boundaries(&self, window: u8, axis: Axis) -> (i32, i32) {
        self.windows[window as usize][axis as usize]
    }

    fn bg_hw_id(&self, bg: TargetId) -> Option<u8> {
        self.bgs[bg.0 as usize].map(|(hw_id, _)| hw_id)
    }

    fn bg_state(&self, bg: TargetId) -> BgState {
        self.bgs[bg.0 as usize].map(|(_, state)| state).unwrap_or_default()
    }

    fn sprite_hw_id(&self, sprite: TargetId) -> Option<u8> {
        self.sprites[sprite.0 as usize].map(|(hw_id, _)| hw_id)
    }

    fn sprite_attributes(&self, sprite: TargetId) -> ObjAttributes {
        self.sprites[sprite.0 as usize].map(|(_, attributes)| attributes).unwrap_or_default()
    }

    fn mosaic(&self) -> Mosaic {
        self.mosaic
    }

    fn reload_windows(&mut self) {
        self.window_reloads += 1;
    }

    fn reload_bgs(&mut self) {
        self.bg_reloads += 1;
    }

    fn reload_sprites(&mut self) {
        self.sprite_reloads += 1;
    }

    fn reload_mosaic(&mut self) {
        self.mosaic_reloads += 1;
    }
}

/// Runs `handler` the way the scheduler does on a visible target.
fn output<H: HblankEffectHandler>(
    handler: &mut H,
    target: TargetId,
    input: &[H::Input],
    targets: &FakeTargets,
) -> (RegisterAddress, [u16; DISPLAY_HEIGHT]) {
    assert!(handler.target_visible(target, targets));
    let last = handler.setup_target(target, targets);
    let mut output = [0; DISPLAY_HEIGHT];
    handler.write_output_values(target, &last, input, &mut output);
    (handler.output_register(target, &last, targets), output)
}

fn palette_colors(seed: u8) -> [Color; 16] {
    core::array::from_fn(|index| Color::new(seed, index as u8, 0))
}

#[test]
fn test_palette_color_gradient() {
    let palettes = Palettes::new(BankId::BgPalettes, Box::new(RamBank::new(512)));
    let colors = palette_colors(1);
    let palette = palettes.create(&PaletteItem::new(&colors, Bpp::Four)).unwrap();
    let gradient = LineValues::from_fn(|line| Color::new(0, 0, (line / 6) as u8));

    let mut effects = HblankEffects::new();
    let mut targets = FakeTargets::default();
    let id = effects
        .create(PaletteColorHandler::new(palette.clone(), 3), TargetId(0), gradient, &targets)
        .unwrap();
    assert_eq!(effects.update(&mut targets), 1);
    effects.commit();

    assert_eq!(effects.output_register(id), Some(RegisterAddress::new(0x0500_0006)));
    assert_eq!(effects.table(id)[0], 0);
    assert_eq!(effects.table(id)[159], Color::new(0, 0, 26).raw());
    assert_eq!(palette.handle().ref_count(), 2);
}

#[test]
fn test_palette_color_follows_compaction() {
    let palettes = Palettes::new(BankId::SpritePalettes, Box::new(RamBank::new(512)));
    let first_colors = palette_colors(1);
    let second_colors = palette_colors(2);
    let first = palettes.create(&PaletteItem::new(&first_colors, Bpp::Four)).unwrap();
    let second = palettes.create(&PaletteItem::new(&second_colors, Bpp::Four)).unwrap();

    let mut effects = HblankEffects::new();
    let mut targets = FakeTargets::default();
    let values = LineValues::filled(Color::WHITE);
    let id = effects
        .create(PaletteColorHandler::new(second.clone(), 1), TargetId(0), values, &targets)
        .unwrap();
    effects.update(&mut targets);
    effects.commit();
    assert_eq!(effects.output_register(id), Some(BankId::SpritePalettes.address(34)));
    assert_eq!(effects.update(&mut targets), 0);

    drop(first);
    assert_eq!(palettes.registry().compact(), 1);
    assert_eq!(second.hw_index(), 0);
    assert_eq!(effects.update(&mut targets), 1);
    effects.commit();
    assert_eq!(effects.output_register(id), Some(BankId::SpritePalettes.address(2)));
}

#[test]
#[should_panic(expected = "Invalid color index")]
fn test_palette_color_index_range() {
    let palettes = Palettes::new(BankId::BgPalettes, Box::new(RamBank::new(512)));
    let colors = palette_colors(1);
    let palette = palettes.create(&PaletteItem::new(&colors, Bpp::Four)).unwrap();
    PaletteColorHandler::new(palette, 16);
}

#[test]
fn test_window_boundaries() {
    let mut targets = FakeTargets::default();
    targets.windows[1][Axis::Horizontal as usize] = (10, 50);
    let mut input = [(Fixed::ZERO, Fixed::ZERO); DISPLAY_HEIGHT];
    input[0] = (Fixed::from_int(-20), Fixed::from_int(300));
    input[1] = (Fixed::from_int(5), Fixed::from_ratio(-5, 2));

    let mut handler = RectWindowBoundariesHandler::horizontal();
    let (register, values) = output(&mut handler, TargetId(1), &input[..], &targets);
    assert_eq!(register, window_horizontal(1));
    assert_eq!(values[0], 0x00F0);
    assert_eq!(values[1], (15 << 8) | 48);
    assert_eq!(values[2], (10 << 8) | 50);

    handler.cleanup(TargetId(1), &mut targets);
    assert_eq!(targets.window_reloads, 1);
}

#[test]
fn test_window_moves_trigger_update() {
    let mut targets = FakeTargets::default();
    let mut handler = RectWindowBoundariesHandler::vertical();
    let mut last = handler.setup_target(TargetId(0), &targets);
    assert!(!handler.target_updated(TargetId(0), &mut last, &targets));
    targets.windows[0][Axis::Vertical as usize] = (0, 80);
    assert!(handler.target_updated(TargetId(0), &mut last, &targets));
    assert_eq!(last, (0, 80));
}

fn bg_targets() -> FakeTargets {
    let mut control = BgControl::default();
    control.set_char_block(1).set_bpp8(true).set_screen_block(8).set_priority(2);
    let mut targets = FakeTargets::default();
    targets.bgs[0] = Some((2, BgState { control, horizontal_offset: 100, vertical_offset: 0 }));
    targets
}

#[test]
fn test_bg_attributes() {
    let mut targets = bg_targets();
    let mut input = [BgAttributes::default(); DISPLAY_HEIGHT];
    input[1] = BgAttributes { priority: 3, mosaic: true, screen_block: Some(9) };

    let mut handler = BgAttributesHandler;
    let (register, values) = output(&mut handler, TargetId(0), &input[..], &targets);
    assert_eq!(register, bg_control(2));

    let first = BgControl(values[0]);
    assert_eq!((first.priority(), first.char_block(), first.screen_block()), (0, 1, 8));
    assert!(first.bpp8() && !first.mosaic());

    let second = BgControl(values[1]);
    assert_eq!((second.priority(), second.char_block(), second.screen_block()), (3, 1, 9));
    assert!(second.mosaic());

    targets.bgs[0] = None;
    assert!(!handler.target_visible(TargetId(0), &targets));
    handler.cleanup(TargetId(0), &mut targets);
    assert_eq!(targets.bg_reloads, 1);
}

#[test]
fn test_bg_position_wraps() {
    let targets = bg_targets();
    let input = LineValues::from_fn(|line| Fixed::from_int(line as i32 - 101));
    let mut handler = BgPositionHandler::horizontal();
    let (register, values) = output(&mut handler, TargetId(0), &input.borrow()[..], &targets);
    assert_eq!(register, bg_horizontal_offset(2));
    assert_eq!(values[0], 0x1FF);
    assert_eq!(values[1], 0);
    assert_eq!(values[11], 10);
}

#[test]
fn test_sprite_position_follows_hw_slot() {
    let mut attributes = ObjAttributes { attr0: 0x2000, attr1: 0x4000, attr2: 0 };
    attributes.set_x(100).set_y(20);
    let mut targets = FakeTargets::default();
    targets.sprites[1] = Some((5, attributes));

    let input = [Fixed::from_int(-30); DISPLAY_HEIGHT];
    let mut handler = SpritePositionHandler::horizontal();
    let (register, values) = output(&mut handler, TargetId(1), &input[..], &targets);
    assert_eq!(register, attribute_register(5, AttributeWord::Second));
    assert_eq!(values[0], 0x4000 | 70);

    let mut vertical = SpritePositionHandler::vertical();
    let (register, values) = output(&mut vertical, TargetId(1), &input[..], &targets);
    assert_eq!(register, attribute_register(5, AttributeWord::First));
    assert_eq!(values[0], 0x2000 | (-10i32 & 0xFF) as u16);

    let mut last = handler.setup_target(TargetId(1), &targets);
    targets.sprites[1] = Some((6, attributes));
    assert!(handler.target_updated(TargetId(1), &mut last, &targets));
    assert_eq!(handler.output_register(TargetId(1), &last, &targets), attribute_register(6, AttributeWord::Second));
}

#[test]
fn test_sprite_tile_attributes() {
    let mut targets = FakeTargets::default();
    targets.sprites[0] = Some((9, ObjAttributes::default()));
    let mut input = [SpriteTileAttributes::default(); DISPLAY_HEIGHT];
    input[80] = SpriteTileAttributes { tile: 10, palette: 2, priority: 1 };

    let mut handler = SpriteTileAttributesHandler;
    let (register, values) = output(&mut handler, TargetId(0), &input[..], &targets);
    assert_eq!(register, attribute_register(9, AttributeWord::Third));
    assert_eq!(values[0], 0);
    assert_eq!(values[80], 10 | (1 << 10) | (2 << 12));
    assert_eq!(SpriteTileAttributes::from(ObjAttributes { attr0: 0, attr1: 0, attr2: values[80] }), input[80]);

    targets.sprites[0] = None;
    assert!(!handler.target_visible(TargetId(0), &targets));
    handler.cleanup(TargetId(0), &mut targets);
    assert_eq!(targets.sprite_reloads, 1);
}

#[test]
fn test_mosaic_stretch() {
    let mut targets = FakeTargets::default();
    targets.mosaic.set(MosaicField::BgsHorizontal, 3);
    let mut input = [Fixed::ZERO; DISPLAY_HEIGHT];
    input[1] = Fixed::from_ratio(1, 2);
    input[2] = Fixed::ONE;

    let mut handler = MosaicStretchHandler::new(MosaicField::SpritesVertical);
    let (register, values) = output(&mut handler, TargetId(0), &input[..], &targets);
    assert_eq!(register, MOSAIC);
    assert_eq!(values[0], 0x0003);
    assert_eq!(values[1], 0x8003);
    assert_eq!(values[2], 0xF003);

    handler.cleanup(TargetId(0), &mut targets);
    assert_eq!(targets.mosaic_reloads, 1);
}

#[test]
#[should_panic(expected = "Invalid stretch")]
fn test_mosaic_stretch_range() {
    stretch_value(Fixed::from_int(2));
}
