// SPDX-License-Identifier: GPL-3.0-only

//! Still image encoding
//!
//! - JPEG (with quality control, alpha dropped)
//! - PNG (lossless, alpha kept)
//!
//! Encoding is CPU-bound; async callers run it on a blocking worker.

use crate::errors::{StorageError, StorageResult};
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    #[default]
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }

    /// Parse a format name or extension
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(EncodingFormat::Jpeg),
            "png" => Some(EncodingFormat::Png),
            _ => None,
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data ready for saving
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

/// Photo encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with the given format and quality
    pub fn new(format: EncodingFormat, quality: EncodingQuality) -> Self {
        Self { format, quality }
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    pub fn quality(&self) -> EncodingQuality {
        self.quality
    }

    /// Encode an RGBA image into the configured format
    pub fn encode(&self, image: &RgbaImage) -> StorageResult<EncodedImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(StorageError::Encoding("Image has no pixels".to_string()));
        }

        let data = match self.format {
            EncodingFormat::Jpeg => Self::encode_jpeg(image, self.quality)?,
            EncodingFormat::Png => Self::encode_png(image)?,
        };

        debug!(size = data.len(), format = ?self.format, "Encoding complete");

        Ok(EncodedImage {
            data,
            format: self.format,
            width,
            height,
        })
    }

    /// Encode image as JPEG
    fn encode_jpeg(image: &RgbaImage, quality: EncodingQuality) -> StorageResult<Vec<u8>> {
        let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        let mut buffer = Vec::new();

        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut buffer,
            quality.jpeg_quality(),
        );
        encoder.encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )?;

        Ok(buffer)
    }

    /// Encode image as PNG
    fn encode_png(image: &RgbaImage) -> StorageResult<Vec<u8>> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }
}
