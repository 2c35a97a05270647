// SPDX-License-Identifier: GPL-3.0-only
// Shared types for the capture device abstraction

//! Shared types for capture devices

use chrono::{DateTime, Local};
use image::RgbaImage;
use std::time::Duration;

pub use crate::errors::{BackendResult, CaptureError};

/// Pixel layout of a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    /// This is the canonical format used throughout the pipeline after normalization
    Rgba,
    /// BGRA - 32-bit with alpha (B G R A byte order)
    Bgra,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    Rgb24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba | Self::Bgra => 4,
            Self::Rgb24 => 3,
            Self::Gray8 => 1,
        }
    }
}

/// EXIF-style orientation tag attached to a captured frame
///
/// Describes the transform needed to display the stored pixels upright.
/// Values follow the EXIF `Orientation` tag (1..=8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// 1: stored upright
    #[default]
    Normal,
    /// 2: mirrored left to right
    FlipHorizontal,
    /// 3: upside down
    Rotate180,
    /// 4: mirrored top to bottom
    FlipVertical,
    /// 5: mirrored across the main diagonal
    Transpose,
    /// 6: needs a 90 degree clockwise turn
    Rotate90,
    /// 7: mirrored across the anti-diagonal
    Transverse,
    /// 8: needs a 270 degree clockwise turn
    Rotate270,
}

impl Orientation {
    /// All eight orientations in EXIF order
    pub const ALL: [Orientation; 8] = [
        Orientation::Normal,
        Orientation::FlipHorizontal,
        Orientation::Rotate180,
        Orientation::FlipVertical,
        Orientation::Transpose,
        Orientation::Rotate90,
        Orientation::Transverse,
        Orientation::Rotate270,
    ];

    /// Parse an EXIF orientation value. Out-of-range values are treated as upright.
    pub fn from_exif(value: u8) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }

    /// EXIF orientation value (1..=8)
    pub fn to_exif(&self) -> u8 {
        match self {
            Orientation::Normal => 1,
            Orientation::FlipHorizontal => 2,
            Orientation::Rotate180 => 3,
            Orientation::FlipVertical => 4,
            Orientation::Transpose => 5,
            Orientation::Rotate90 => 6,
            Orientation::Transverse => 7,
            Orientation::Rotate270 => 8,
        }
    }

    /// Whether this is the identity orientation
    pub fn is_identity(&self) -> bool {
        *self == Orientation::Normal
    }

    /// Check if normalizing swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self, self.to_exif())
    }
}

/// Raw frame returned by a capture device
///
/// Owned by the controller until the orientation normalizer consumes it.
#[derive(Clone)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Row stride in bytes
    pub stride: u32,
    pub data: Vec<u8>,
    pub orientation: Orientation,
    /// Wall-clock time the shutter fired
    pub captured_at: DateTime<Local>,
}

impl CapturedFrame {
    /// Wrap a tightly packed RGBA image
    pub fn from_rgba(image: RgbaImage, orientation: Orientation, captured_at: DateTime<Local>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            format: PixelFormat::Rgba,
            stride: width * 4,
            data: image.into_raw(),
            orientation,
            captured_at,
        }
    }

    /// Bytes in one row of pixels, `None` if the width overflows
    pub fn row_len(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.format.bytes_per_pixel())
    }

    /// Minimum byte length for the declared geometry, `None` if it overflows
    pub fn expected_len(&self) -> Option<usize> {
        if self.height == 0 {
            return Some(0);
        }
        (self.stride as usize)
            .checked_mul(self.height as usize - 1)?
            .checked_add(self.row_len()?)
    }

    /// Whether the declared geometry is backed by enough bytes
    pub fn is_well_formed(&self) -> bool {
        match (self.row_len(), self.expected_len()) {
            (Some(row), Some(expected)) => {
                self.stride as usize >= row && self.data.len() >= expected
            }
            _ => false,
        }
    }

    /// True when the frame carries no pixels at all
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// True when the frame is upright, tightly packed RGBA
    pub fn is_canonical(&self) -> bool {
        let Some(row) = self.row_len() else {
            return false;
        };
        self.format == PixelFormat::Rgba
            && self.stride as usize == row
            && row.checked_mul(self.height as usize) == Some(self.data.len())
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("stride", &self.stride)
            .field("data", &format_args!("{} bytes", self.data.len()))
            .field("orientation", &self.orientation)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// Manual exposure applied to the device for a single capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureOverride {
    pub iso: f32,
    pub duration: Duration,
}

/// Exposure range supported by a device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureLimits {
    pub min_iso: f32,
    pub max_iso: f32,
    pub min_duration: Duration,
    pub max_duration: Duration,
}

impl ExposureLimits {
    /// Clamp a requested ISO and shutter duration into the supported range
    pub fn clamp(&self, iso: f32, duration: Duration) -> ExposureOverride {
        let iso = if iso.is_finite() { iso } else { self.min_iso };
        ExposureOverride {
            iso: iso.clamp(self.min_iso, self.max_iso.max(self.min_iso)),
            duration: duration.clamp(self.min_duration, self.max_duration.max(self.min_duration)),
        }
    }
}

impl Default for ExposureLimits {
    fn default() -> Self {
        Self {
            min_iso: 50.0,
            max_iso: 3200.0,
            min_duration: Duration::from_micros(125),
            max_duration: Duration::from_secs(1),
        }
    }
}
