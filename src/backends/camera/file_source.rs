// SPDX-License-Identifier: GPL-3.0-only

//! File-backed capture device
//!
//! Decodes a still image from disk each time the shutter fires. The EXIF
//! orientation stored in the file travels with the frame untouched, so the
//! normalizer sees exactly what a sensor with that mounting would report.

use super::CaptureDevice;
use super::types::{
    BackendResult, CaptureError, CapturedFrame, ExposureLimits, ExposureOverride, Orientation,
};
use crate::constants::file_formats;
use futures::future::BoxFuture;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Capture device that reads its frames from an image file
pub struct FileCaptureDevice {
    path: PathBuf,
    name: String,
    limits: ExposureLimits,
    /// Exposure applied for the most recent capture
    last_exposure: Mutex<Option<ExposureOverride>>,
}

impl FileCaptureDevice {
    /// Create a device for the given image path
    ///
    /// The file is not opened until the first capture.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            limits: ExposureLimits::default(),
            last_exposure: Mutex::new(None),
        }
    }

    /// Override the exposure range this device reports
    pub fn with_limits(mut self, limits: ExposureLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Source file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exposure applied for the most recent capture, if any
    pub fn last_exposure(&self) -> Option<ExposureOverride> {
        *self
            .last_exposure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_exposure(&self, exposure: Option<ExposureOverride>) {
        *self
            .last_exposure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = exposure;
    }
}

impl CaptureDevice for FileCaptureDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn exposure_limits(&self) -> ExposureLimits {
        self.limits
    }

    fn capture_once(
        &self,
        exposure: Option<ExposureOverride>,
    ) -> BoxFuture<'_, BackendResult<CapturedFrame>> {
        Box::pin(async move {
            if let Some(exposure) = exposure {
                info!(
                    iso = exposure.iso,
                    shutter_secs = exposure.duration.as_secs_f64(),
                    "Applying manual exposure"
                );
            }
            self.set_exposure(exposure);

            let path = self.path.clone();
            tokio::task::spawn_blocking(move || load_image_as_frame(&path))
                .await
                .map_err(|e| CaptureError::Device(format!("Capture task error: {}", e)))?
        })
    }
}

/// Decode an image file into a captured frame, keeping its orientation tag
pub fn load_image_as_frame(path: &Path) -> BackendResult<CapturedFrame> {
    info!(path = %path.display(), "Loading image file");

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !file_formats::is_image_extension(extension) {
        return Err(CaptureError::Device(format!(
            "Unsupported file format: {}",
            extension
        )));
    }

    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;

    let orientation = match decoder.orientation() {
        Ok(orientation) => Orientation::from_exif(orientation.to_exif()),
        Err(e) => {
            warn!(error = %e, "Could not read orientation, assuming upright");
            Orientation::Normal
        }
    };

    let image = DynamicImage::from_decoder(decoder)?.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(CaptureError::NoData);
    }

    debug!(
        width = image.width(),
        height = image.height(),
        orientation = %orientation,
        "Image loaded successfully"
    );

    Ok(CapturedFrame::from_rgba(
        image,
        orientation,
        chrono::Local::now(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    #[tokio::test]
    async fn test_capture_from_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let device = FileCaptureDevice::new(&path);
        assert_eq!(device.name(), "frame.png");

        let frame = device.capture_once(None).await.unwrap();
        assert_eq!((frame.width, frame.height), (8, 6));
        assert_eq!(frame.orientation, Orientation::Normal);
        assert!(frame.is_canonical());
        assert_eq!(&frame.data[..4], &[10, 20, 30, 255]);
    }

    #[tokio::test]
    async fn test_records_exposure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        RgbaImage::new(2, 2).save(&path).unwrap();

        let device = FileCaptureDevice::new(&path);
        let exposure = ExposureOverride {
            iso: 400.0,
            duration: Duration::from_millis(20),
        };
        device.capture_once(Some(exposure)).await.unwrap();
        assert_eq!(device.last_exposure(), Some(exposure));
    }

    #[tokio::test]
    async fn test_missing_file_is_device_error() {
        let device = FileCaptureDevice::new("/nonexistent/filmcam/frame.png");
        let err = device.capture_once(None).await.unwrap_err();
        assert!(matches!(err, CaptureError::Io(_)));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = load_image_as_frame(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, CaptureError::Device(_)));
    }
}
