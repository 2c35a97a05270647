// SPDX-License-Identifier: MPL-2.0

//! Capture device abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  CaptureController  │  ← Sole mutator of device exposure
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CaptureDevice Trait │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!     ┌─────────────┐
//!     │ File source │  ← Concrete implementation (tests use scripted mocks)
//!     └─────────────┘
//! ```

pub mod file_source;
pub mod types;

pub use file_source::FileCaptureDevice;
pub use types::*;

use futures::future::BoxFuture;

/// Hardware capture collaborator
///
/// A device is a single shared resource. Only the capture controller calls
/// into it, and never with more than one capture outstanding.
pub trait CaptureDevice: Send + Sync {
    /// Human readable device name for logging
    fn name(&self) -> &str;

    /// Exposure range the device accepts for manual captures
    fn exposure_limits(&self) -> ExposureLimits {
        ExposureLimits::default()
    }

    /// Fire the shutter once
    ///
    /// When `exposure` is set the device applies it before triggering the
    /// shutter; the values are already clamped to [`Self::exposure_limits`].
    ///
    /// # Returns
    /// * `Ok(CapturedFrame)` - Raw frame with its orientation tag
    /// * `Err(CaptureError)` - Device failure or no data
    fn capture_once(
        &self,
        exposure: Option<ExposureOverride>,
    ) -> BoxFuture<'_, BackendResult<CapturedFrame>>;
}
