//! Palette-wide color transforms.
//!
//! Every intensity is a [`Fixed`] in `[0, 1]` and gets reduced to 5 fractional
//! bits before use, so `0` leaves the colors untouched and `1` applies the
//! effect fully. Functions come in pairs: the plain one rewrites `colors` in
//! place, the `*_into` one reads `source` and writes `destination`.

use crate::color::{Color, CHANNEL_MAX};
use crate::config::MAX_PALETTE_COLORS;
use crate::fixed::Fixed;

const MAX: i32 = CHANNEL_MAX as i32;

fn level(intensity: Fixed, name: &str) -> i32 {
    assert!(intensity.is_unit(), "Invalid {}: {:?}", name, intensity);
    intensity.to_precision(5)
}

fn check_counts(source: &[Color], destination: &[Color]) {
    assert!(!source.is_empty(), "Invalid source colors count: {}", source.len());
    assert!(
        destination.len() >= source.len(),
        "Invalid destination colors count: {} - {}",
        destination.len(),
        source.len()
    );
}

fn map_channels(source: &[Color], destination: &mut [Color], f: impl Fn(i32) -> i32) {
    for (out, color) in destination.iter_mut().zip(source) {
        let [r, g, b] = color.channels().map(|c| f(c as i32).clamp(0, MAX) as u8);
        *out = Color::from_channels([r, g, b]);
    }
}

fn in_place(colors: &mut [Color], apply: impl FnOnce(&[Color], &mut [Color])) {
    assert!(!colors.is_empty(), "Invalid colors count: {}", colors.len());
    assert!(colors.len() <= MAX_PALETTE_COLORS, "Invalid colors count: {}", colors.len());
    let mut source = [Color::BLACK; MAX_PALETTE_COLORS];
    source[..colors.len()].copy_from_slice(colors);
    apply(&source[..colors.len()], colors);
}

/// Moves every channel towards white.
pub fn brightness_into(source: &[Color], brightness: Fixed, destination: &mut [Color]) {
    check_counts(source, destination);
    let value = level(brightness, "brightness");
    map_channels(source, destination, |c| c + (((MAX - c) * value) >> 5));
}

pub fn brightness(brightness: Fixed, colors: &mut [Color]) {
    in_place(colors, |source, destination| brightness_into(source, brightness, destination));
}

/// Pushes every channel away from the mid level.
pub fn contrast_into(source: &[Color], contrast: Fixed, destination: &mut [Color]) {
    check_counts(source, destination);
    let value = level(contrast, "contrast");
    map_channels(source, destination, |c| c + (((c - 16) * value) >> 4));
}

pub fn contrast(contrast: Fixed, colors: &mut [Color]) {
    in_place(colors, |source, destination| contrast_into(source, contrast, destination));
}

/// Scales every channel up proportionally to its own value.
pub fn intensity_into(source: &[Color], intensity: Fixed, destination: &mut [Color]) {
    check_counts(source, destination);
    let value = level(intensity, "intensity");
    map_channels(source, destination, |c| c + ((c * value) >> 5));
}

pub fn intensity(intensity: Fixed, colors: &mut [Color]) {
    in_place(colors, |source, destination| intensity_into(source, intensity, destination));
}

pub fn invert_into(source: &[Color], destination: &mut [Color]) {
    check_counts(source, destination);
    for (out, color) in destination.iter_mut().zip(source) {
        *out = Color::from_raw(color.raw() ^ 0x7FFF);
    }
}

pub fn invert(colors: &mut [Color]) {
    assert!(!colors.is_empty(), "Invalid colors count: {}", colors.len());
    for color in colors {
        *color = Color::from_raw(color.raw() ^ 0x7FFF);
    }
}

/// Blends every color towards its luma.
pub fn grayscale_into(source: &[Color], intensity: Fixed, destination: &mut [Color]) {
    check_counts(source, destination);
    assert!(source.len() <= MAX_PALETTE_COLORS, "Invalid source colors count: {}", source.len());
    let value = level(intensity, "grayscale intensity");
    for (out, color) in destination.iter_mut().zip(source) {
        let [r, g, b] = color.channels().map(i32::from);
        let gray = (r * 77 + g * 151 + b * 28) >> 8;
        map_channels(core::slice::from_ref(color), core::slice::from_mut(out), |c| {
            c + (((gray - c) * value) >> 5)
        });
    }
}

pub fn grayscale(intensity: Fixed, colors: &mut [Color]) {
    in_place(colors, |source, destination| grayscale_into(source, intensity, destination));
}

/// Hue units per sector of the color hexagon.
const HUE_SECTOR: i32 = 32;
const HUE_TURN: i32 = HUE_SECTOR * 6;

/// `value * numerator / denominator`, rounded to nearest.
fn scaled(value: i32, numerator: i32, denominator: i32) -> i32 {
    let magnitude = (2 * value.abs() * numerator + denominator) / (2 * denominator);
    magnitude * value.signum()
}

fn shift_hue(color: Color, shift: i32) -> Color {
    let [r, g, b] = color.channels().map(i32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;
    if chroma == 0 {
        return color;
    }

    let hue = if max == r {
        scaled(g - b, HUE_SECTOR, chroma).rem_euclid(HUE_TURN)
    } else if max == g {
        2 * HUE_SECTOR + scaled(b - r, HUE_SECTOR, chroma)
    } else {
        4 * HUE_SECTOR + scaled(r - g, HUE_SECTOR, chroma)
    };
    let hue = (hue + shift).rem_euclid(HUE_TURN);

    let step = scaled(chroma, hue % HUE_SECTOR, HUE_SECTOR);
    let rise = min + step;
    let fall = max - step;
    let [r, g, b] = match hue / HUE_SECTOR {
        0 => [max, rise, min],
        1 => [fall, max, min],
        2 => [min, max, rise],
        3 => [min, fall, max],
        4 => [rise, min, max],
        _ => [max, min, fall],
    };
    Color::from_channels([r, g, b].map(|c| c.clamp(0, MAX) as u8))
}

/// Rotates the hue of every color. An intensity of `1` is a full turn.
/// Grays have no hue and stay as they are.
pub fn hue_shift_into(source: &[Color], intensity: Fixed, destination: &mut [Color]) {
    check_counts(source, destination);
    assert!(source.len() <= MAX_PALETTE_COLORS, "Invalid source colors count: {}", source.len());
    let shift = (level(intensity, "hue shift intensity") * HUE_TURN / 32) % HUE_TURN;
    for (out, color) in destination.iter_mut().zip(source) {
        *out = if shift == 0 { *color } else { shift_hue(*color, shift) };
    }
}

pub fn hue_shift(intensity: Fixed, colors: &mut [Color]) {
    in_place(colors, |source, destination| hue_shift_into(source, intensity, destination));
}

/// Blends every color towards `fade_color`.
pub fn fade_into(source: &[Color], fade_color: Color, intensity: Fixed, destination: &mut [Color]) {
    check_counts(source, destination);
    let value = level(intensity, "fade intensity");
    let target = fade_color.channels().map(i32::from);
    for (out, color) in destination.iter_mut().zip(source) {
        let channels = color.channels().map(i32::from);
        let mut blended = [0u8; 3];
        for (index, channel) in blended.iter_mut().enumerate() {
            let c = channels[index];
            *channel = (c + (((target[index] - c) * value) >> 5)).clamp(0, MAX) as u8;
        }
        *out = Color::from_channels(blended);
    }
}

pub fn fade(fade_color: Color, intensity: Fixed, colors: &mut [Color]) {
    in_place(colors, |source, destination| fade_into(source, fade_color, intensity, destination));
}

/// Shifts colors `count` positions to the right, wrapping around. Negative
/// counts shift to the left.
pub fn rotate_into(source: &[Color], count: i32, destination: &mut [Color]) {
    check_counts(source, destination);
    let len = source.len() as i32;
    assert!(len <= MAX_PALETTE_COLORS as i32, "Invalid source colors count: {}", len);
    assert!(count.unsigned_abs() < len as u32, "Invalid rotate count: {} - {}", count, len);
    for (index, color) in source.iter().enumerate() {
        let to = (index as i32 + count).rem_euclid(len) as usize;
        destination[to] = *color;
    }
}

pub fn rotate(count: i32, colors: &mut [Color]) {
    if count != 0 {
        in_place(colors, |source, destination| rotate_into(source, count, destination));
    }
}
