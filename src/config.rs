// SPDX-License-Identifier: GPL-3.0-only

use crate::app::state::ProcessingRequest;
use crate::constants::{naming, overlay};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::{EncodingFormat, EncodingQuality, FilmStyle, PhotoEncoder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Persisted user settings
///
/// Missing fields take their defaults so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Film style applied to new captures
    pub film_style: FilmStyle,
    pub light_leak_enabled: bool,
    /// Light leak strength (0.0 - 1.0)
    pub light_leak_intensity: f32,
    /// Custom light leak texture; the built-in texture is used when unset
    pub light_leak_texture: Option<PathBuf>,
    pub date_stamp_enabled: bool,
    /// Integer glyph scale of the date stamp
    pub date_stamp_scale: u32,
    /// Distance in pixels from the right and bottom edges
    pub date_stamp_inset: u32,
    pub manual_exposure_enabled: bool,
    pub iso: f32,
    pub shutter_seconds: f64,
    /// Encoding used for saved photos
    pub output_format: EncodingFormat,
    pub jpeg_quality: EncodingQuality,
    /// Override of the photo directory
    pub photo_directory: Option<PathBuf>,
    /// Give up on a capture after this many milliseconds (disabled by default)
    pub capture_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            film_style: FilmStyle::default(),
            light_leak_enabled: false,
            light_leak_intensity: overlay::DEFAULT_LIGHT_LEAK_INTENSITY,
            light_leak_texture: None,
            date_stamp_enabled: false,
            date_stamp_scale: overlay::DEFAULT_DATE_STAMP_SCALE,
            date_stamp_inset: overlay::DEFAULT_DATE_STAMP_INSET,
            manual_exposure_enabled: false,
            iso: 100.0,
            shutter_seconds: 1.0 / 60.0,
            output_format: EncodingFormat::default(),
            jpeg_quality: EncodingQuality::default(),
            photo_directory: None,
            capture_timeout_ms: None, // Wait for the device indefinitely
        }
    }
}

impl Config {
    /// Location of the config file, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(naming::CONFIG_SUBDIRECTORY)
                .join(naming::CONFIG_FILE_NAME)
        })
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save to the default location
    pub fn save(&self) -> AppResult<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("No config directory available".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Snapshot the current settings for one capture
    pub fn processing_request(&self) -> ProcessingRequest {
        let mut request =
            ProcessingRequest::new(self.film_style).with_date_stamp(self.date_stamp_enabled);
        if self.light_leak_enabled {
            request = request.with_light_leak(self.light_leak_intensity);
        }
        if self.manual_exposure_enabled {
            request = request.with_manual_exposure(self.iso, self.shutter());
        }
        request
    }

    /// Shutter duration; negative or non-finite values become zero
    pub fn shutter(&self) -> Duration {
        Duration::try_from_secs_f64(self.shutter_seconds).unwrap_or(Duration::ZERO)
    }

    pub fn capture_timeout(&self) -> Option<Duration> {
        self.capture_timeout_ms.map(Duration::from_millis)
    }

    pub fn encoder(&self) -> PhotoEncoder {
        PhotoEncoder::new(self.output_format, self.jpeg_quality)
    }

    /// Directory photos are saved to
    pub fn photo_directory(&self) -> PathBuf {
        self.photo_directory
            .clone()
            .unwrap_or_else(default_photo_directory)
    }
}

/// `<pictures>/filmcam`, falling back to the home directory, then the working directory
pub fn default_photo_directory() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(naming::PHOTO_SUBDIRECTORY)
}
