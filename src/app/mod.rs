// SPDX-License-Identifier: MPL-2.0

//! Capture application core
//!
//! This module contains the request/result types and the controller that
//! runs one capture from shutter press to saved photo.
//!
//! # Architecture
//!
//! - `state`: Request snapshot, pipeline state and result types
//! - `controller`: Busy-flag owning state machine
//!
//! # Main Types
//!
//! - `CaptureController`: Accepts requests and publishes `CaptureEvent`s
//! - `ProcessingRequest`: Immutable per-capture settings
//! - `ProcessingResult`: Terminal status plus the finished image

pub mod controller;
pub mod state;

pub use controller::CaptureController;
pub use state::{
    CaptureEvent, CaptureStatus, ManualExposure, PipelineState, ProcessingRequest,
    ProcessingResult,
};
