// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for still capture
//!
//! Heavy pixel work runs on blocking workers so the async runtime and the
//! result context stay responsive while a capture is processed.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Raw Frame    │ ──▶ │  Photo Pipeline   │ ──▶ │ Photo Store  │
//! │ (any orient.)│     │  - Normalize      │     │ (JPEG / PNG) │
//! │              │     │  - Film style     │     │              │
//! │              │     │  - Overlays       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Film processing stages and still image encoders

pub mod photo;
