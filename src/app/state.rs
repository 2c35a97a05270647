// SPDX-License-Identifier: GPL-3.0-only

//! Capture request, pipeline state and result types

use crate::errors::{CaptureError, StorageError};
use crate::pipelines::photo::FilmStyle;
use crate::storage::SavedPhoto;
use image::RgbaImage;
use std::time::Duration;

/// Manual exposure values requested by the user, before device clamping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualExposure {
    pub iso: f32,
    pub shutter: Duration,
}

/// Settings snapshot taken when the shutter is pressed
///
/// A request is a plain value: it is built once, moved into the pipeline
/// and never changes while that capture runs. Later edits in the UI only
/// affect the next request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingRequest {
    style: FilmStyle,
    light_leak_enabled: bool,
    light_leak_intensity: f32,
    date_stamp_enabled: bool,
    manual_exposure_enabled: bool,
    manual_exposure: ManualExposure,
}

impl ProcessingRequest {
    /// Request for `style` with every overlay and manual exposure off
    pub fn new(style: FilmStyle) -> Self {
        Self {
            style,
            light_leak_enabled: false,
            light_leak_intensity: 0.0,
            date_stamp_enabled: false,
            manual_exposure_enabled: false,
            manual_exposure: ManualExposure {
                iso: 100.0,
                shutter: Duration::from_millis(16),
            },
        }
    }

    /// Enable the light leak. Intensity is clamped into [0, 1].
    pub fn with_light_leak(mut self, intensity: f32) -> Self {
        self.light_leak_enabled = true;
        self.light_leak_intensity = clamp_intensity(intensity);
        self
    }

    pub fn with_date_stamp(mut self, enabled: bool) -> Self {
        self.date_stamp_enabled = enabled;
        self
    }

    /// Enable manual exposure; the device clamps the values to its range
    pub fn with_manual_exposure(mut self, iso: f32, shutter: Duration) -> Self {
        self.manual_exposure_enabled = true;
        self.manual_exposure = ManualExposure { iso, shutter };
        self
    }

    pub fn style(&self) -> FilmStyle {
        self.style
    }

    /// Light leak intensity when the light leak is enabled
    pub fn light_leak_intensity(&self) -> Option<f32> {
        self.light_leak_enabled.then_some(self.light_leak_intensity)
    }

    pub fn date_stamp_enabled(&self) -> bool {
        self.date_stamp_enabled
    }

    /// Manual exposure values when manual exposure is enabled
    pub fn manual_exposure(&self) -> Option<ManualExposure> {
        self.manual_exposure_enabled.then_some(self.manual_exposure)
    }
}

fn clamp_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}

/// Capture/process/persist state machine
///
/// ```text
/// Idle → Capturing → Processing → Persisting → Idle
///          └──────────────┴─────────────┴──── error ──→ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Ready to accept a request
    #[default]
    Idle,
    /// Waiting on the capture device
    Capturing,
    /// Normalizing, styling and compositing
    Processing,
    /// Authorizing and writing to the photo store
    Persisting,
}

impl PipelineState {
    /// Check if a request is in flight
    pub fn is_busy(&self) -> bool {
        !matches!(self, PipelineState::Idle)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Capturing => "capturing",
            PipelineState::Processing => "processing",
            PipelineState::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

/// Terminal status of one capture
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureStatus {
    /// Photo processed and written
    Success,
    /// Device failed or returned no usable data
    DeviceError(CaptureError),
    /// Photo library authorization was refused; nothing was written
    LibraryAccessDenied,
    /// Authorization granted but the write failed
    StorageFailed(StorageError),
}

impl CaptureStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CaptureStatus::Success)
    }
}

impl std::fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureStatus::Success => write!(f, "Success"),
            CaptureStatus::DeviceError(e) => write!(f, "Device error: {}", e),
            CaptureStatus::LibraryAccessDenied => write!(f, "Photo library access denied"),
            CaptureStatus::StorageFailed(e) => write!(f, "Storage failed: {}", e),
        }
    }
}

/// Outcome delivered once per accepted request
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub status: CaptureStatus,
    /// Final processed image; absent when the device produced nothing
    pub image: Option<RgbaImage>,
    /// Where the photo was stored on success
    pub saved: Option<SavedPhoto>,
}

impl ProcessingResult {
    pub(crate) fn device_error(error: CaptureError) -> Self {
        Self {
            status: CaptureStatus::DeviceError(error),
            image: None,
            saved: None,
        }
    }
}

/// Notifications sent to the result context
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// The controller moved to a new state
    StateChanged(PipelineState),
    /// A request reached its terminal state; sent after the busy flag is released
    Completed(ProcessingResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = ProcessingRequest::new(FilmStyle::Normal);
        assert_eq!(request.light_leak_intensity(), None);
        assert!(!request.date_stamp_enabled());
        assert_eq!(request.manual_exposure(), None);
    }

    #[test]
    fn test_intensity_is_clamped() {
        let request = ProcessingRequest::new(FilmStyle::Kodak).with_light_leak(1.7);
        assert_eq!(request.light_leak_intensity(), Some(1.0));
        let request = ProcessingRequest::new(FilmStyle::Kodak).with_light_leak(-0.2);
        assert_eq!(request.light_leak_intensity(), Some(0.0));
        let request = ProcessingRequest::new(FilmStyle::Kodak).with_light_leak(f32::NAN);
        assert_eq!(request.light_leak_intensity(), Some(0.0));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let original = ProcessingRequest::new(FilmStyle::Fuji).with_date_stamp(true);
        let snapshot = original.clone();
        let edited = original.with_date_stamp(false);
        assert!(snapshot.date_stamp_enabled());
        assert!(!edited.date_stamp_enabled());
    }

    #[test]
    fn test_busy_states() {
        assert!(!PipelineState::Idle.is_busy());
        assert!(PipelineState::Capturing.is_busy());
        assert!(PipelineState::Processing.is_busy());
        assert!(PipelineState::Persisting.is_busy());
    }
}
