// SPDX-License-Identifier: GPL-3.0-only

//! Overlay compositing: light leak and date stamp
//!
//! The light leak is screen-blended over the styled image first; the date
//! stamp is drawn last so it always sits on top. A missing overlay resource
//! never fails a capture, the image just passes through without it.

use super::glyphs::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::constants::overlay as consts;
use chrono::{DateTime, Local};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Translucent light leak texture, shared read-only across captures
#[derive(Debug, Clone)]
pub struct LightLeakTexture {
    image: Arc<RgbaImage>,
}

impl LightLeakTexture {
    /// Built-in warm leak: an orange glow from the upper left and a red
    /// streak along the right edge, transparent elsewhere
    pub fn procedural() -> Self {
        let size = consts::LIGHT_LEAK_TEXTURE_SIZE;
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let u = x as f32 / (size - 1) as f32;
            let v = y as f32 / (size - 1) as f32;

            let glow_dist = (u * u + (v - 0.15) * (v - 0.15)).sqrt();
            let glow = (1.0 - glow_dist / 0.9).max(0.0).powi(2);
            let streak = ((u - 0.75) / 0.25).max(0.0).powi(2)
                * (0.5 + 0.5 * (v * std::f32::consts::PI).sin());

            let weight = glow + streak;
            if weight <= 0.0 {
                return Rgba([0, 0, 0, 0]);
            }
            let mix = |orange: f32, red: f32| ((orange * glow + red * streak) / weight) as u8;
            Rgba([
                mix(255.0, 255.0),
                mix(140.0, 60.0),
                mix(40.0, 80.0),
                (weight.min(1.0) * 220.0) as u8,
            ])
        });
        Self {
            image: Arc::new(image),
        }
    }

    /// Wrap an existing texture. Empty images are rejected.
    pub fn from_image(image: RgbaImage) -> Option<Self> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        Some(Self {
            image: Arc::new(image),
        })
    }

    /// Load a texture from disk, logging and returning `None` on failure
    pub fn load(path: &Path) -> Option<Self> {
        match image::open(path) {
            Ok(image) => Self::from_image(image.to_rgba8()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Light leak texture unavailable");
                None
            }
        }
    }

    /// Scale to cover `width` x `height`, then center-crop to exactly that size
    pub fn fitted(&self, width: u32, height: u32) -> RgbaImage {
        let (tw, th) = self.image.dimensions();
        if (tw, th) == (width, height) {
            return (*self.image).clone();
        }

        let scale = (width as f64 / tw as f64).max(height as f64 / th as f64);
        let sw = ((tw as f64 * scale).ceil() as u32).max(width);
        let sh = ((th as f64 * scale).ceil() as u32).max(height);
        let scaled = imageops::resize(&*self.image, sw, sh, FilterType::Triangle);

        imageops::crop_imm(&scaled, (sw - width) / 2, (sh - height) / 2, width, height).to_image()
    }
}

/// Light leak request: which texture and how strongly
#[derive(Debug, Clone, Copy)]
pub struct LightLeak<'a> {
    pub texture: &'a LightLeakTexture,
    /// 0.0 = invisible, 1.0 = full screen blend
    pub intensity: f32,
}

/// Text of the date stamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStamp {
    pub text: String,
}

impl DateStamp {
    /// Stamp text for a capture time, formatted `YYYY-MM-DD HH:MM`
    pub fn from_time(time: &DateTime<Local>) -> Self {
        Self {
            text: time.format(consts::DATE_STAMP_FORMAT).to_string(),
        }
    }
}

/// Fixed date stamp geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateStampStyle {
    /// Pixels per font unit
    pub scale: u32,
    /// Distance from the right and bottom edges in pixels
    pub inset: u32,
}

impl Default for DateStampStyle {
    fn default() -> Self {
        Self {
            scale: consts::DEFAULT_DATE_STAMP_SCALE,
            inset: consts::DEFAULT_DATE_STAMP_INSET,
        }
    }
}

impl DateStampStyle {
    /// Style with the scale clamped to `1..=MAX_DATE_STAMP_SCALE`
    pub fn new(scale: u32, inset: u32) -> Self {
        let clamped = scale.clamp(1, consts::MAX_DATE_STAMP_SCALE);
        if clamped != scale {
            warn!(scale, clamped, "Date stamp scale out of range");
        }
        Self {
            scale: clamped,
            inset,
        }
    }

    /// Glyph scale actually used for drawing
    pub fn effective_scale(&self) -> u32 {
        self.scale.clamp(1, consts::MAX_DATE_STAMP_SCALE)
    }

    /// Outline thickness in pixels
    pub fn stroke_width(&self) -> u32 {
        (self.effective_scale() / 2).max(1)
    }
}

/// Composite the optional overlays onto a styled image
///
/// Light leak first, date stamp last. Both are independent.
pub fn composite(
    mut image: RgbaImage,
    light_leak: Option<LightLeak<'_>>,
    date_stamp: Option<&DateStamp>,
    stamp_style: &DateStampStyle,
) -> RgbaImage {
    if let Some(leak) = light_leak {
        screen_blend(&mut image, leak.texture, leak.intensity);
    }
    if let Some(stamp) = date_stamp {
        draw_date_stamp(&mut image, &stamp.text, stamp_style);
    }
    image
}

/// Screen-blend `texture` over `image`, weighted by texture alpha and `intensity`
pub fn screen_blend(image: &mut RgbaImage, texture: &LightLeakTexture, intensity: f32) {
    let intensity = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (width, height) = image.dimensions();
    if intensity == 0.0 || width == 0 || height == 0 {
        return;
    }

    let leak = texture.fitted(width, height);
    debug!(width, height, intensity, "Blending light leak");

    for (base, over) in image.pixels_mut().zip(leak.pixels()) {
        let alpha = over[3] as f32 / 255.0 * intensity;
        if alpha <= 0.0 {
            continue;
        }
        for c in 0..3 {
            let b = base[c] as f32 / 255.0;
            let t = over[c] as f32 / 255.0;
            let screen = 1.0 - (1.0 - b) * (1.0 - t);
            let out = b + (screen - b) * alpha;
            base[c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}

/// Draw right-aligned, outlined text in the lower-right corner
///
/// Glyph pixels outside the image are clipped.
pub fn draw_date_stamp(image: &mut RgbaImage, text: &str, style: &DateStampStyle) {
    let scale = style.effective_scale();
    let (text_width, text_height) = glyphs::text_size(text, scale);
    if text_width == 0 {
        return;
    }

    let (width, height) = image.dimensions();
    let origin_x = width as i64 - style.inset as i64 - text_width as i64;
    let origin_y = height as i64 - style.inset as i64 - text_height as i64;
    let stroke = style.stroke_width() as i64;
    let scale = scale as i64;

    // Only cells whose outline can reach the image are kept
    let visible = |x: i64, y: i64| {
        x + stroke >= 0
            && y + stroke >= 0
            && x - stroke < width as i64
            && y - stroke < height as i64
    };

    let mut inked = Vec::new();
    for (index, ch) in text.chars().enumerate() {
        let glyph_x = origin_x + index as i64 * GLYPH_ADVANCE as i64 * scale;
        if glyph_x - stroke >= width as i64 {
            break;
        }
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !glyphs::is_set(ch, col, row) {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let x = glyph_x + col as i64 * scale + sx;
                        let y = origin_y + row as i64 * scale + sy;
                        if visible(x, y) {
                            inked.push((x, y));
                        }
                    }
                }
            }
        }
    }

    let put = |image: &mut RgbaImage, x: i64, y: i64, rgb: [u8; 3]| {
        if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
            image.put_pixel(x as u32, y as u32, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        }
    };

    for &(x, y) in &inked {
        for dy in -stroke..=stroke {
            for dx in -stroke..=stroke {
                put(image, x + dx, y + dy, consts::DATE_STAMP_STROKE);
            }
        }
    }
    for &(x, y) in &inked {
        put(image, x, y, consts::DATE_STAMP_FILL);
    }

    debug!(text, scale, origin_x, origin_y, "Date stamp drawn");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn gray(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([90, 100, 110, 255]))
    }

    fn flat_leak() -> LightLeakTexture {
        LightLeakTexture::from_image(RgbaImage::from_pixel(4, 4, Rgba([250, 160, 60, 255]))).unwrap()
    }

    fn brightness(image: &RgbaImage) -> u64 {
        image.pixels().map(|p| p[0] as u64 + p[1] as u64 + p[2] as u64).sum()
    }

    #[test]
    fn test_zero_intensity_matches_no_leak() {
        let texture = LightLeakTexture::procedural();
        let style = DateStampStyle::default();
        let without = composite(gray(40, 30), None, None, &style);
        let with_zero = composite(
            gray(40, 30),
            Some(LightLeak {
                texture: &texture,
                intensity: 0.0,
            }),
            None,
            &style,
        );
        assert_eq!(without, with_zero);
    }

    #[test]
    fn test_intensity_is_monotonic() {
        let texture = flat_leak();
        let mut previous = brightness(&gray(16, 16));
        for step in 1..=10 {
            let mut image = gray(16, 16);
            screen_blend(&mut image, &texture, step as f32 / 10.0);
            let current = brightness(&image);
            assert!(current >= previous, "step {}: {} < {}", step, current, previous);
            previous = current;
        }

        // Full intensity equals a plain screen blend
        let mut image = gray(1, 1);
        screen_blend(&mut image, &texture, 1.0);
        let expected = |b: f32, t: f32| ((1.0 - (1.0 - b / 255.0) * (1.0 - t / 255.0)) * 255.0).round() as u8;
        assert_eq!(
            image.get_pixel(0, 0),
            &Rgba([expected(90.0, 250.0), expected(100.0, 160.0), expected(110.0, 60.0), 255])
        );
    }

    #[test]
    fn test_blend_never_darkens() {
        let texture = LightLeakTexture::procedural();
        let base = RgbaImage::from_fn(64, 48, |x, y| Rgba([(x * 4) as u8, (y * 5) as u8, 128, 255]));
        let mut blended = base.clone();
        screen_blend(&mut blended, &texture, 1.0);
        for (before, after) in base.pixels().zip(blended.pixels()) {
            for c in 0..3 {
                assert!(after[c] >= before[c]);
            }
        }
        assert_ne!(base, blended);
    }

    #[test]
    fn test_texture_fits_exactly() {
        let texture = LightLeakTexture::procedural();
        assert_eq!(texture.fitted(100, 100).dimensions(), (100, 100));
        assert_eq!(texture.fitted(640, 480).dimensions(), (640, 480));
        assert_eq!(texture.fitted(3, 1000).dimensions(), (3, 1000));
    }

    #[test]
    fn test_missing_texture_is_none() {
        assert!(LightLeakTexture::load(Path::new("/nonexistent/leak.png")).is_none());
        assert!(LightLeakTexture::from_image(RgbaImage::new(0, 0)).is_none());
    }

    #[test]
    fn test_date_stamp_format() {
        let time = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 0).unwrap();
        assert_eq!(DateStamp::from_time(&time).text, "2024-03-09 07:05");
    }

    #[test]
    fn test_date_stamp_lands_in_lower_right() {
        let style = DateStampStyle { scale: 1, inset: 4 };
        let stamp = DateStamp {
            text: "2024-03-09 07:05".to_string(),
        };
        let image = composite(gray(100, 100), None, Some(&stamp), &style);

        let white = |x: u32, y: u32| image.get_pixel(x, y) == &Rgba([255, 255, 255, 255]);
        let dark = |x: u32, y: u32| image.get_pixel(x, y) == &Rgba([24, 24, 24, 255]);

        let mut lower_right_fill = 0;
        for y in 0..100 {
            for x in 0..100 {
                if white(x, y) {
                    assert!(y >= 89 && y < 96, "fill outside text rows at ({}, {})", x, y);
                    if x >= 50 {
                        lower_right_fill += 1;
                    }
                }
            }
        }
        assert!(lower_right_fill > 0);
        assert!((0..100).any(|x| dark(x, 88)), "outline above text expected");
        // Right edge of the last glyph sits at the inset
        assert!((89..96).any(|y| white(95, y)));
        assert!((0..100).all(|y| !white(96, y)));
    }

    #[test]
    fn test_both_overlays_stamp_on_top() {
        let texture = flat_leak();
        let style = DateStampStyle { scale: 2, inset: 2 };
        let stamp = DateStamp {
            text: "88".to_string(),
        };
        let image = composite(
            gray(40, 40),
            Some(LightLeak {
                texture: &texture,
                intensity: 1.0,
            }),
            Some(&stamp),
            &style,
        );
        // Stamp fill is pure white even over the leak; untouched pixels show the leak
        assert!(image.pixels().any(|p| p == &Rgba([255, 255, 255, 255])));
        assert_ne!(image.get_pixel(0, 0), &Rgba([90, 100, 110, 255]));
    }

    #[test]
    fn test_stamp_scale_is_bounded() {
        let style = DateStampStyle::new(50_000_000, 24);
        assert_eq!(style.scale, consts::MAX_DATE_STAMP_SCALE);
        assert_eq!(DateStampStyle::new(0, 24).scale, 1);

        // A hand-built style with a huge scale draws at the maximum
        let unbounded = DateStampStyle {
            scale: 50_000_000,
            inset: 24,
        };
        assert_eq!(unbounded.effective_scale(), consts::MAX_DATE_STAMP_SCALE);
        let stamp = DateStamp {
            text: "2024-03-09 07:05".to_string(),
        };
        let image = composite(gray(100, 100), None, Some(&stamp), &unbounded);
        assert_eq!(image.dimensions(), (100, 100));
        assert!(image.pixels().any(|p| p == &Rgba([255, 255, 255, 255])));
    }
}
