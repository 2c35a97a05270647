// SPDX-License-Identifier: MPL-2.0

//! Film style transform engine
//!
//! Each [`FilmStyle`] maps to a fixed, ordered list of [`FilterStage`]s.
//! Stages work on a floating point copy of the image and always return a
//! new buffer, so a stage that cannot handle its input is simply skipped
//! and the previous buffer carries on down the chain.

use crate::constants::film::{self, ColorControls};
use image::{Rgba, Rgba32FImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Film stock emulation selected for a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilmStyle {
    /// Neutral rendering with light sharpening and tone recovery
    #[default]
    Normal,
    /// Warm, saturated print film look
    Kodak,
    /// Cool, green-leaning slide film look
    Fuji,
    /// Style identifier this build does not know; renders unchanged
    #[serde(other)]
    Unknown,
}

impl FilmStyle {
    /// Styles with a stage table, for UI iteration
    pub const ALL: [FilmStyle; 3] = [FilmStyle::Normal, FilmStyle::Kodak, FilmStyle::Fuji];

    /// Get display name for the style
    pub fn display_name(&self) -> &'static str {
        match self {
            FilmStyle::Normal => "Normal",
            FilmStyle::Kodak => "Kodak",
            FilmStyle::Fuji => "Fuji",
            FilmStyle::Unknown => "Unknown",
        }
    }

    /// Parse a style name, case-insensitively. Unrecognised names map to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" => FilmStyle::Normal,
            "kodak" => FilmStyle::Kodak,
            "fuji" => FilmStyle::Fuji,
            _ => FilmStyle::Unknown,
        }
    }

    /// The ordered stage list for this style
    pub fn stages(&self) -> &'static [FilterStage] {
        match self {
            FilmStyle::Normal => NORMAL_STAGES,
            FilmStyle::Kodak => KODAK_STAGES,
            FilmStyle::Fuji => FUJI_STAGES,
            FilmStyle::Unknown => IDENTITY_STAGES,
        }
    }
}

impl std::fmt::Display for FilmStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One pure image operation with fixed parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStage {
    /// Print film process emulation: lifted blacks, soft S-curve, warm shadows
    FilmicBase,
    /// Slide film emulation: firmer S-curve, denser color, cool shadows
    FilmicChrome,
    /// Contrast, then saturation, then brightness in a single pass
    ColorControls(ColorControls),
    /// Luminance sharpening against a 3x3 box blur
    Sharpen { amount: f32 },
    /// Highlight compression (1.0 = none) and shadow lift (0.0 = none)
    HighlightShadow { highlight: f32, shadow: f32 },
    /// White balance shift that treats `neutral_kelvin` as the new white
    Temperature { neutral_kelvin: f32, tint: f32 },
}

const NORMAL_STAGES: &[FilterStage] = &[
    FilterStage::ColorControls(film::NORMAL_CONTROLS),
    FilterStage::Sharpen {
        amount: film::NORMAL_SHARPNESS,
    },
    FilterStage::HighlightShadow {
        highlight: film::NORMAL_HIGHLIGHT,
        shadow: film::NORMAL_SHADOW,
    },
];

const KODAK_STAGES: &[FilterStage] = &[
    FilterStage::FilmicBase,
    FilterStage::ColorControls(film::KODAK_CONTROLS),
    FilterStage::Temperature {
        neutral_kelvin: film::KODAK_NEUTRAL_KELVIN,
        tint: 0.0,
    },
];

const FUJI_STAGES: &[FilterStage] = &[
    FilterStage::FilmicChrome,
    FilterStage::ColorControls(film::FUJI_CONTROLS),
    FilterStage::Temperature {
        neutral_kelvin: film::FUJI_NEUTRAL_KELVIN,
        tint: film::FUJI_TINT,
    },
];

const IDENTITY_STAGES: &[FilterStage] = &[FilterStage::ColorControls(ColorControls::IDENTITY)];

impl FilterStage {
    /// Short stage name for logs
    pub fn name(&self) -> &'static str {
        match self {
            FilterStage::FilmicBase => "filmic-base",
            FilterStage::FilmicChrome => "filmic-chrome",
            FilterStage::ColorControls(_) => "color-controls",
            FilterStage::Sharpen { .. } => "sharpen",
            FilterStage::HighlightShadow { .. } => "highlight-shadow",
            FilterStage::Temperature { .. } => "temperature",
        }
    }

    /// Run the stage. `None` means the stage could not handle this buffer.
    pub fn apply(&self, image: &Rgba32FImage) -> Option<Rgba32FImage> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }

        match *self {
            FilterStage::FilmicBase => Some(map_rgb(image, filmic_base)),
            FilterStage::FilmicChrome => Some(map_rgb(image, filmic_chrome)),
            FilterStage::ColorControls(controls) => {
                Some(map_rgb(image, |rgb| color_controls(rgb, &controls)))
            }
            FilterStage::Sharpen { amount } => sharpen_luminance(image, amount),
            FilterStage::HighlightShadow { highlight, shadow } => {
                Some(map_rgb(image, |rgb| highlight_shadow(rgb, highlight, shadow)))
            }
            FilterStage::Temperature {
                neutral_kelvin,
                tint,
            } => {
                let gains = temperature_gains(neutral_kelvin, tint);
                Some(map_rgb(image, |[r, g, b]| {
                    [r * gains[0], g * gains[1], b * gains[2]]
                }))
            }
        }
    }
}

/// Apply a film style to an upright RGBA image
///
/// Deterministic and side-effect free: the input is never modified and the
/// same input and style always give the same bytes.
pub fn apply_style(image: &RgbaImage, style: FilmStyle) -> RgbaImage {
    let mut current = to_float(image);

    for stage in style.stages() {
        match stage.apply(&current) {
            Some(next) => {
                debug!(style = %style, stage = stage.name(), "Filter stage applied");
                current = next;
            }
            None => {
                warn!(
                    style = %style,
                    stage = stage.name(),
                    width = current.width(),
                    height = current.height(),
                    "Filter stage produced no output, keeping previous buffer"
                );
            }
        }
    }

    to_u8(&current)
}

/// Convert 8-bit RGBA to normalized floats
pub fn to_float(image: &RgbaImage) -> Rgba32FImage {
    let (width, height) = image.dimensions();
    Rgba32FImage::from_fn(width, height, |x, y| {
        let p = image.get_pixel(x, y);
        Rgba([
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
            p[3] as f32 / 255.0,
        ])
    })
}

/// Convert normalized floats back to 8-bit RGBA, clamping and rounding
pub fn to_u8(image: &Rgba32FImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let p = image.get_pixel(x, y);
        Rgba([
            quantize(p[0]),
            quantize(p[1]),
            quantize(p[2]),
            quantize(p[3]),
        ])
    })
}

#[inline]
fn quantize(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Rec. 709 luma
#[inline]
fn luma([r, g, b]: [f32; 3]) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn s_curve(c: f32, strength: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    c + (c * c * (3.0 - 2.0 * c) - c) * strength
}

/// Map every pixel's RGB through `f`, keeping alpha, clamping to [0, 1]
fn map_rgb<F>(image: &Rgba32FImage, f: F) -> Rgba32FImage
where
    F: Fn([f32; 3]) -> [f32; 3],
{
    let (width, height) = image.dimensions();
    Rgba32FImage::from_fn(width, height, |x, y| {
        let p = image.get_pixel(x, y);
        let [r, g, b] = f([p[0], p[1], p[2]]);
        Rgba([
            r.clamp(0.0, 1.0),
            g.clamp(0.0, 1.0),
            b.clamp(0.0, 1.0),
            p[3],
        ])
    })
}

fn color_controls(rgb: [f32; 3], controls: &ColorControls) -> [f32; 3] {
    let contrasted = rgb.map(|c| (c - 0.5) * controls.contrast + 0.5);
    let l = luma(contrasted);
    contrasted.map(|c| l + (c - l) * controls.saturation + controls.brightness)
}

fn filmic_base(rgb: [f32; 3]) -> [f32; 3] {
    let lifted = rgb.map(|c| 0.03 + 0.94 * s_curve(c, 0.35));
    let warmth = (1.0 - luma(lifted)).powi(2) * 0.04;
    [lifted[0] + warmth, lifted[1], lifted[2] - warmth]
}

fn filmic_chrome(rgb: [f32; 3]) -> [f32; 3] {
    let curved = rgb.map(|c| s_curve(c, 0.25));
    let l = luma(curved);
    // Denser color in the midtones, tapering off toward black and white
    let density = 1.0 + 0.1 * (1.0 - (2.0 * l - 1.0).abs());
    let dense = curved.map(|c| l + (c - l) * density);
    let cool = (1.0 - l).powi(2) * 0.03;
    [dense[0] - cool * 0.5, dense[1] + cool * 0.3, dense[2] + cool]
}

fn highlight_shadow(rgb: [f32; 3], highlight: f32, shadow: f32) -> [f32; 3] {
    let l = luma(rgb);
    let highlight_weight = smoothstep(0.5, 1.0, l);
    let shadow_weight = 1.0 - smoothstep(0.0, 0.5, l);
    let delta = -(1.0 - highlight) * highlight_weight * (l - 0.5)
        + shadow * shadow_weight * (0.5 - l) * 0.5;
    rgb.map(|c| c + delta)
}

fn sharpen_luminance(image: &Rgba32FImage, amount: f32) -> Option<Rgba32FImage> {
    let (width, height) = image.dimensions();
    // A 3x3 neighbourhood needs at least three pixels in each direction
    if width < 3 || height < 3 {
        return None;
    }

    let lumas: Vec<f32> = image.pixels().map(|p| luma([p[0], p[1], p[2]])).collect();
    let at = |x: i64, y: i64| -> f32 {
        let x = x.clamp(0, width as i64 - 1) as usize;
        let y = y.clamp(0, height as i64 - 1) as usize;
        lumas[y * width as usize + x]
    };

    Some(Rgba32FImage::from_fn(width, height, |x, y| {
        let (xi, yi) = (x as i64, y as i64);
        let mut sum = 0.0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                sum += at(xi + dx, yi + dy);
            }
        }
        let detail = (at(xi, yi) - sum / 9.0) * amount;
        let p = image.get_pixel(x, y);
        Rgba([
            (p[0] + detail).clamp(0.0, 1.0),
            (p[1] + detail).clamp(0.0, 1.0),
            (p[2] + detail).clamp(0.0, 1.0),
            p[3],
        ])
    }))
}

/// Convert color temperature in Kelvin to RGB multipliers
///
/// Tanner Helland's approximation of the Planckian locus, normalized so
/// green = 1.0. The result corrects an illuminant of `kelvin` to neutral.
#[allow(clippy::excessive_precision)]
pub fn kelvin_to_rgb_multipliers(kelvin: f32) -> [f32; 3] {
    let temp = (kelvin / 100.0).clamp(10.0, 400.0);

    let (r, g, b) = if temp <= 66.0 {
        let g = 99.4708025861 * temp.ln() - 161.1195681661;
        let b = if temp <= 19.0 {
            0.0
        } else {
            138.5177312231 * (temp - 10.0).ln() - 305.0447927307
        };
        (255.0, g.clamp(0.0, 255.0), b.clamp(0.0, 255.0))
    } else {
        let r = 329.698727446 * (temp - 60.0).powf(-0.1332047592);
        let g = 288.1221695283 * (temp - 60.0).powf(-0.0755148492);
        (r.clamp(0.0, 255.0), g.clamp(0.0, 255.0), 255.0)
    };

    let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
    let g_ref = g.max(0.001);
    [g_ref / r.max(0.001), 1.0, g_ref / b.max(0.001)]
}

/// Channel gains that re-render a reference-white scene as if
/// `neutral_kelvin` were white, with a green (+) / magenta (-) tint
pub fn temperature_gains(neutral_kelvin: f32, tint: f32) -> [f32; 3] {
    let reference = kelvin_to_rgb_multipliers(film::REFERENCE_KELVIN);
    let target = kelvin_to_rgb_multipliers(neutral_kelvin);
    [
        target[0] / reference[0],
        (1.0 + tint / 200.0) * target[1] / reference[1],
        target[2] / reference[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smooth gradient with some texture so every stage has work to do
    fn test_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = if (x + y) % 4 == 0 { 200 } else { 60 };
            Rgba([r, g, b, 255])
        })
    }

    fn channel_means(image: &RgbaImage) -> [f64; 3] {
        let mut sums = [0.0f64; 3];
        for p in image.pixels() {
            for c in 0..3 {
                sums[c] += p[c] as f64;
            }
        }
        let n = (image.width() * image.height()) as f64;
        sums.map(|s| s / n)
    }

    #[test]
    fn test_style_table_shapes() {
        assert_eq!(FilmStyle::Normal.stages().len(), 3);
        assert_eq!(FilmStyle::Kodak.stages()[0], FilterStage::FilmicBase);
        assert_eq!(FilmStyle::Fuji.stages()[0], FilterStage::FilmicChrome);
        assert_eq!(
            FilmStyle::Kodak.stages()[1],
            FilterStage::ColorControls(film::KODAK_CONTROLS)
        );
        assert_eq!(
            FilmStyle::Unknown.stages(),
            &[FilterStage::ColorControls(ColorControls::IDENTITY)]
        );
    }

    #[test]
    fn test_styles_are_deterministic() {
        let input = test_image(32, 24);
        for style in FilmStyle::ALL {
            let first = apply_style(&input, style);
            let second = apply_style(&input, style);
            assert_eq!(first.as_raw(), second.as_raw(), "{}", style);
        }
    }

    #[test]
    fn test_unknown_style_is_identity() {
        let input = test_image(16, 16);
        let output = apply_style(&input, FilmStyle::Unknown);
        assert_eq!(output, input);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = test_image(16, 16);
        let copy = input.clone();
        let _ = apply_style(&input, FilmStyle::Kodak);
        assert_eq!(input, copy);
    }

    #[test]
    fn test_kodak_is_brighter_and_warmer() {
        let input = RgbaImage::from_pixel(8, 8, Rgba([120, 120, 120, 255]));
        let output = apply_style(&input, FilmStyle::Kodak);
        let [r, g, b] = channel_means(&output);
        assert!(g > 120.0, "brightness lift expected, got {}", g);
        assert!(r > b, "warm shift expected: r={} b={}", r, b);
    }

    #[test]
    fn test_fuji_is_cooler_with_green_bias() {
        let input = RgbaImage::from_pixel(8, 8, Rgba([120, 120, 120, 255]));
        let output = apply_style(&input, FilmStyle::Fuji);
        let [r, g, b] = channel_means(&output);
        assert!(b > r, "cool shift expected: r={} b={}", r, b);
        assert!(g > r, "green bias expected: r={} g={}", r, g);
    }

    #[test]
    fn test_color_controls_order() {
        // Contrast first, then saturation around luma, then brightness
        let controls = ColorControls {
            contrast: 2.0,
            saturation: 0.0,
            brightness: 0.1,
        };
        let [r, g, b] = color_controls([0.75, 0.75, 0.75], &controls);
        assert!((r - 1.1).abs() < 1e-5);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn test_sharpen_falls_back_on_tiny_images() {
        let input = test_image(2, 2);
        let float = to_float(&input);
        assert!(
            FilterStage::Sharpen { amount: 0.6 }
                .apply(&float)
                .is_none()
        );

        // Normal still renders: the sharpen stage is skipped, the others run
        let expected = {
            let controls = FilterStage::ColorControls(film::NORMAL_CONTROLS)
                .apply(&float)
                .unwrap();
            let toned = FilterStage::HighlightShadow {
                highlight: film::NORMAL_HIGHLIGHT,
                shadow: film::NORMAL_SHADOW,
            }
            .apply(&controls)
            .unwrap();
            to_u8(&toned)
        };
        assert_eq!(apply_style(&input, FilmStyle::Normal), expected);
    }

    #[test]
    fn test_sharpen_increases_edge_contrast() {
        let input = RgbaImage::from_fn(9, 9, |x, _| {
            if x < 4 {
                Rgba([80, 80, 80, 255])
            } else {
                Rgba([170, 170, 170, 255])
            }
        });
        let sharpened = to_u8(
            &FilterStage::Sharpen { amount: 0.6 }
                .apply(&to_float(&input))
                .unwrap(),
        );
        assert!(sharpened.get_pixel(3, 4)[0] < 80);
        assert!(sharpened.get_pixel(4, 4)[0] > 170);
        assert_eq!(sharpened.get_pixel(0, 4)[0], 80);
    }

    #[test]
    fn test_empty_image_passes_through() {
        let input = RgbaImage::new(0, 0);
        let output = apply_style(&input, FilmStyle::Fuji);
        assert_eq!(output.dimensions(), (0, 0));
    }

    #[test]
    fn test_temperature_gains_direction() {
        let warm = temperature_gains(film::KODAK_NEUTRAL_KELVIN, 0.0);
        assert!(warm[0] > 1.0 && warm[2] < 1.0);
        let cool = temperature_gains(film::FUJI_NEUTRAL_KELVIN, 0.0);
        assert!(cool[0] < 1.0 && cool[2] > 1.0);
        let neutral = temperature_gains(film::REFERENCE_KELVIN, 0.0);
        assert!(neutral.iter().all(|g| (g - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(FilmStyle::from_name("Kodak"), FilmStyle::Kodak);
        assert_eq!(FilmStyle::from_name(" fuji "), FilmStyle::Fuji);
        assert_eq!(FilmStyle::from_name("portra"), FilmStyle::Unknown);
        let parsed: FilmStyle = serde_json::from_str("\"velvia\"").unwrap();
        assert_eq!(parsed, FilmStyle::Unknown);
    }
}
