// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! The film style values are part of the processing contract: the same
//! input and style must always produce the same output.

/// Per-style color adjustment values
pub mod film {
    /// Contrast, saturation and brightness for each style
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ColorControls {
        pub contrast: f32,
        pub saturation: f32,
        pub brightness: f32,
    }

    impl ColorControls {
        /// Values that leave every pixel unchanged
        pub const IDENTITY: ColorControls = ColorControls {
            contrast: 1.0,
            saturation: 1.0,
            brightness: 0.0,
        };

        pub fn is_identity(&self) -> bool {
            *self == Self::IDENTITY
        }
    }

    pub const NORMAL_CONTROLS: ColorControls = ColorControls {
        contrast: 1.05,
        saturation: 1.0,
        brightness: 0.0,
    };

    pub const KODAK_CONTROLS: ColorControls = ColorControls {
        contrast: 1.15,
        saturation: 1.2,
        brightness: 0.05,
    };

    pub const FUJI_CONTROLS: ColorControls = ColorControls {
        contrast: 0.95,
        saturation: 1.05,
        brightness: -0.02,
    };

    /// Luminance sharpening amount for the Normal style
    pub const NORMAL_SHARPNESS: f32 = 0.6;
    /// Highlight amount for the Normal style (1.0 = untouched)
    pub const NORMAL_HIGHLIGHT: f32 = 0.8;
    /// Shadow lift for the Normal style (0.0 = untouched)
    pub const NORMAL_SHADOW: f32 = 0.6;

    /// Scene white point assumed by the temperature stages
    pub const REFERENCE_KELVIN: f32 = 6500.0;
    /// Neutral point for the Kodak warm shift
    pub const KODAK_NEUTRAL_KELVIN: f32 = 7500.0;
    /// Neutral point for the Fuji cool shift
    pub const FUJI_NEUTRAL_KELVIN: f32 = 5500.0;
    /// Fuji green bias (-100..100, positive = green)
    pub const FUJI_TINT: f32 = 10.0;
}

/// Overlay geometry and defaults
pub mod overlay {
    /// Edge length of the built-in light leak texture
    pub const LIGHT_LEAK_TEXTURE_SIZE: u32 = 512;
    /// Default light leak intensity
    pub const DEFAULT_LIGHT_LEAK_INTENSITY: f32 = 0.5;

    /// Date stamp format (chrono strftime)
    pub const DATE_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
    /// Default glyph scale (a 5x7 cell becomes 30x42 pixels)
    pub const DEFAULT_DATE_STAMP_SCALE: u32 = 6;
    /// Largest accepted glyph scale
    pub const MAX_DATE_STAMP_SCALE: u32 = 64;
    /// Default distance from the right and bottom edges in pixels
    pub const DEFAULT_DATE_STAMP_INSET: u32 = 24;
    /// Glyph fill color
    pub const DATE_STAMP_FILL: [u8; 3] = [255, 255, 255];
    /// Glyph outline color
    pub const DATE_STAMP_STROKE: [u8; 3] = [24, 24, 24];
}

/// Captured frame limits
pub mod frame {
    /// Largest buffer a malformed frame is zero-padded to
    pub const MAX_PADDED_FRAME_BYTES: usize = 1 << 30;
}

/// Output file naming
pub mod naming {
    /// Prefix for saved photos
    pub const PHOTO_PREFIX: &str = "IMG_";
    /// Timestamp format for saved photo names
    pub const PHOTO_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
    /// Subdirectory created under the pictures directory
    pub const PHOTO_SUBDIRECTORY: &str = "filmcam";
    /// Directory under the user config dir
    pub const CONFIG_SUBDIRECTORY: &str = "filmcam";
    pub const CONFIG_FILE_NAME: &str = "config.json";
}

/// Supported input file formats
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}
