// SPDX-License-Identifier: MPL-2.0

//! filmcam - film look still capture
//!
//! This library captures a single still frame, runs it through a film
//! emulation pipeline and hands the result to a photo store.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Capture controller and request/result types
//! - [`backends`]: Capture device abstraction
//! - [`pipelines`]: Orientation, film styles, overlays and encoders
//! - [`config`]: User configuration handling
//! - [`storage`]: Photo store abstraction and directory store
//!
//! # Example
//!
//! ```ignore
//! let (controller, mut events) = CaptureController::new(device, store, pipeline);
//! controller.submit(config.processing_request());
//! while let Some(event) = events.recv().await { /* ... */ }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use app::{
    CaptureController, CaptureEvent, CaptureStatus, PipelineState, ProcessingRequest,
    ProcessingResult,
};
pub use backends::camera::{CaptureDevice, CapturedFrame, FileCaptureDevice, Orientation};
pub use config::Config;
pub use errors::{AppError, AppResult, CaptureError, StorageError};
pub use pipelines::photo::{FilmStyle, PhotoPipeline};
pub use storage::{Authorization, DirectoryStore, PhotoStore, SavedPhoto};
