// SPDX-License-Identifier: GPL-3.0-only

//! Orientation normalization
//!
//! Turns a raw captured frame into an upright, tightly packed RGBA buffer.
//! Upright RGBA frames are moved straight into the output image without
//! copying or re-rendering.

use crate::backends::camera::types::{CapturedFrame, Orientation, PixelFormat};
use crate::constants::frame::MAX_PADDED_FRAME_BYTES;
use image::RgbaImage;
use image::imageops;
use tracing::{debug, warn};

/// Normalize a captured frame to an upright RGBA buffer
///
/// Never fails. A frame whose buffer is shorter than its declared geometry
/// is zero-padded and its orientation tag is ignored. Geometry too large to
/// pad yields an empty image.
pub fn normalize(frame: CapturedFrame) -> RgbaImage {
    let orientation = frame.orientation;

    if !frame.is_well_formed() {
        warn!(
            width = frame.width,
            height = frame.height,
            len = frame.data.len(),
            expected = ?frame.expected_len(),
            "Malformed frame buffer, treating as upright"
        );
        return match pad(frame) {
            Some(padded) => to_rgba(padded),
            None => {
                warn!("Frame geometry out of range, dropping pixels");
                RgbaImage::new(0, 0)
            }
        };
    }

    let image = to_rgba(frame);
    if orientation.is_identity() {
        return image;
    }

    debug!(orientation = %orientation, "Reorienting frame");
    apply_orientation(image, orientation)
}

/// Apply the transform that brings an image stored with `orientation` upright
pub fn apply_orientation(mut image: RgbaImage, orientation: Orientation) -> RgbaImage {
    match orientation {
        Orientation::Normal => image,
        Orientation::FlipHorizontal => {
            imageops::flip_horizontal_in_place(&mut image);
            image
        }
        Orientation::Rotate180 => {
            imageops::rotate180_in_place(&mut image);
            image
        }
        Orientation::FlipVertical => {
            imageops::flip_vertical_in_place(&mut image);
            image
        }
        Orientation::Transpose => {
            let mut rotated = imageops::rotate90(&image);
            imageops::flip_horizontal_in_place(&mut rotated);
            rotated
        }
        Orientation::Rotate90 => imageops::rotate90(&image),
        Orientation::Transverse => {
            let mut rotated = imageops::rotate90(&image);
            imageops::flip_vertical_in_place(&mut rotated);
            rotated
        }
        Orientation::Rotate270 => imageops::rotate270(&image),
    }
}

fn pad(mut frame: CapturedFrame) -> Option<CapturedFrame> {
    let row = frame.row_len()?;
    frame.stride = frame.stride.max(u32::try_from(row).ok()?);

    let expected = frame.expected_len()?;
    let output = (frame.width as usize)
        .checked_mul(frame.height as usize)?
        .checked_mul(4)?;
    if expected > MAX_PADDED_FRAME_BYTES || output > MAX_PADDED_FRAME_BYTES {
        return None;
    }

    if frame.data.len() < expected {
        frame.data.resize(expected, 0);
    }
    frame.orientation = Orientation::Normal;
    Some(frame)
}

/// Convert a well-formed frame of any supported pixel format to RGBA
fn to_rgba(frame: CapturedFrame) -> RgbaImage {
    let (width, height) = (frame.width, frame.height);

    if frame.is_canonical() {
        if let Some(image) = RgbaImage::from_raw(width, height, frame.data) {
            return image;
        }
        return RgbaImage::new(width, height);
    }

    let bpp = frame.format.bytes_per_pixel();
    let stride = frame.stride as usize;
    let mut out = Vec::with_capacity(width as usize * height as usize * 4);

    for row in 0..height as usize {
        let start = row * stride;
        let line = &frame.data[start..start + width as usize * bpp];
        for px in line.chunks_exact(bpp) {
            let rgba = match frame.format {
                PixelFormat::Rgba => [px[0], px[1], px[2], px[3]],
                PixelFormat::Bgra => [px[2], px[1], px[0], px[3]],
                PixelFormat::Rgb24 => [px[0], px[1], px[2], 255],
                PixelFormat::Gray8 => [px[0], px[0], px[0], 255],
            };
            out.extend_from_slice(&rgba);
        }
    }

    RgbaImage::from_raw(width, height, out).unwrap_or_else(|| RgbaImage::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use image::Rgba;

    /// 3x2 image where every pixel is unique
    fn numbered_image() -> RgbaImage {
        RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, (y * 3 + x) as u8, 255]))
    }

    fn frame(orientation: Orientation) -> CapturedFrame {
        CapturedFrame::from_rgba(numbered_image(), orientation, Local::now())
    }

    #[test]
    fn test_identity_is_zero_copy() {
        let frame = frame(Orientation::Normal);
        let ptr = frame.data.as_ptr();
        let image = normalize(frame);
        assert_eq!(image.as_raw().as_ptr(), ptr);
        assert_eq!(image, numbered_image());
    }

    #[test]
    fn test_dimensions_follow_orientation() {
        for orientation in Orientation::ALL {
            let image = normalize(frame(orientation));
            if orientation.swaps_dimensions() {
                assert_eq!(image.dimensions(), (2, 3), "{}", orientation);
            } else {
                assert_eq!(image.dimensions(), (3, 2), "{}", orientation);
            }
        }
    }

    #[test]
    fn test_known_corners() {
        // Rotate90: stored left column becomes the top row, read bottom-up
        let image = normalize(frame(Orientation::Rotate90));
        assert_eq!(image.get_pixel(0, 0)[2], 3);
        assert_eq!(image.get_pixel(1, 0)[2], 0);

        // Transpose swaps axes without mirroring
        let image = normalize(frame(Orientation::Transpose));
        assert_eq!(image.get_pixel(1, 0)[2], 3);
        assert_eq!(image.get_pixel(0, 2)[2], 2);

        // FlipHorizontal mirrors each row
        let image = normalize(frame(Orientation::FlipHorizontal));
        assert_eq!(image.get_pixel(0, 0)[2], 2);
    }

    #[test]
    fn test_renormalizing_is_a_no_op() {
        for orientation in Orientation::ALL {
            let first = normalize(frame(orientation));
            let retagged = CapturedFrame::from_rgba(first.clone(), Orientation::Normal, Local::now());
            let second = normalize(retagged);
            assert_eq!(first, second, "{}", orientation);
        }
    }

    #[test]
    fn test_converts_other_formats() {
        let bgr = CapturedFrame {
            width: 2,
            height: 1,
            format: PixelFormat::Bgra,
            stride: 12, // padded rows
            data: vec![1, 2, 3, 255, 4, 5, 6, 128, 0, 0, 0, 0],
            orientation: Orientation::Normal,
            captured_at: Local::now(),
        };
        let image = normalize(bgr);
        assert_eq!(image.get_pixel(0, 0), &Rgba([3, 2, 1, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([6, 5, 4, 128]));

        let gray = CapturedFrame {
            width: 2,
            height: 2,
            format: PixelFormat::Gray8,
            stride: 2,
            data: vec![10, 20, 30, 40],
            orientation: Orientation::Rotate180,
            captured_at: Local::now(),
        };
        let image = normalize(gray);
        assert_eq!(image.get_pixel(0, 0), &Rgba([40, 40, 40, 255]));
    }

    #[test]
    fn test_malformed_buffer_is_padded_and_upright() {
        let mut frame = frame(Orientation::Rotate90);
        frame.data.truncate(8);
        let image = normalize(frame);
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(2, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_oversized_geometry_is_dropped() {
        let wide = CapturedFrame {
            width: 1 << 30,
            height: 1,
            format: PixelFormat::Rgba,
            stride: 0,
            data: Vec::new(),
            orientation: Orientation::Rotate90,
            captured_at: Local::now(),
        };
        assert_eq!(normalize(wide).dimensions(), (0, 0));

        let huge = CapturedFrame {
            width: u32::MAX,
            height: u32::MAX,
            format: PixelFormat::Bgra,
            stride: 7,
            data: vec![1, 2, 3],
            orientation: Orientation::Normal,
            captured_at: Local::now(),
        };
        assert_eq!(normalize(huge).dimensions(), (0, 0));
    }
}
