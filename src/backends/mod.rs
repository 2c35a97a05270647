// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for hardware access
//!
//! The controller talks to capture hardware only through the
//! [`camera::CaptureDevice`] trait, so a sensor, a file on disk or a
//! scripted test double are interchangeable.
//!
//! # Modules
//!
//! - [`camera`]: Capture device trait, frame types and the file-backed device

pub mod camera;
