// SPDX-License-Identifier: MPL-2.0

//! Film photo processing pipeline
//!
//! ```text
//! CapturedFrame → Normalize → Film Style → Overlays → RgbaImage
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Normalize**: bring the raw frame upright as tightly packed RGBA
//! 2. **Film Style**: run the style's fixed stage table
//! 3. **Overlays**: screen-blend the light leak, then draw the date stamp
//!
//! Stages run strictly in order on one blocking worker. None of them can
//! fail the capture: a stage that cannot produce output hands its input on.

pub mod encoding;
pub mod glyphs;
pub mod orientation;
pub mod overlay;
pub mod styles;

pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
pub use overlay::{DateStamp, DateStampStyle, LightLeak, LightLeakTexture};
pub use styles::{FilmStyle, FilterStage, apply_style};

use crate::app::state::ProcessingRequest;
use crate::backends::camera::types::CapturedFrame;
use crate::config::Config;
use chrono::{DateTime, Local};
use image::RgbaImage;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Film processing pipeline with its read-only overlay resources
#[derive(Debug, Clone)]
pub struct PhotoPipeline {
    light_leak: Option<LightLeakTexture>,
    stamp_style: DateStampStyle,
}

impl PhotoPipeline {
    /// Pipeline with the built-in light leak and default stamp geometry
    pub fn new() -> Self {
        Self {
            light_leak: Some(LightLeakTexture::procedural()),
            stamp_style: DateStampStyle::default(),
        }
    }

    /// Pipeline with explicit overlay resources
    pub fn with_overlays(light_leak: Option<LightLeakTexture>, stamp_style: DateStampStyle) -> Self {
        Self {
            light_leak,
            stamp_style,
        }
    }

    /// Build the overlay resources described by the user configuration
    ///
    /// A configured texture path that cannot be loaded leaves the pipeline
    /// without a light leak rather than silently swapping in the built-in one.
    pub fn from_config(config: &Config) -> Self {
        let light_leak = match &config.light_leak_texture {
            Some(path) => LightLeakTexture::load(path),
            None => Some(LightLeakTexture::procedural()),
        };
        Self::with_overlays(
            light_leak,
            DateStampStyle::new(config.date_stamp_scale, config.date_stamp_inset),
        )
    }

    pub fn stamp_style(&self) -> &DateStampStyle {
        &self.stamp_style
    }

    /// Run normalize → style → overlays on the calling thread
    pub fn process(&self, frame: CapturedFrame, request: &ProcessingRequest) -> RgbaImage {
        let captured_at = frame.captured_at;
        let upright = orientation::normalize(frame);
        self.finish(&upright, &captured_at, request)
    }

    /// Style and overlay an upright image
    fn finish(
        &self,
        upright: &RgbaImage,
        captured_at: &DateTime<Local>,
        request: &ProcessingRequest,
    ) -> RgbaImage {
        let styled = styles::apply_style(upright, request.style());

        let light_leak = match (request.light_leak_intensity(), &self.light_leak) {
            (Some(intensity), Some(texture)) => Some(LightLeak { texture, intensity }),
            (Some(_), None) => {
                warn!("Light leak requested but no texture is available, skipping");
                None
            }
            (None, _) => None,
        };
        let date_stamp = request
            .date_stamp_enabled()
            .then(|| DateStamp::from_time(captured_at));

        overlay::composite(styled, light_leak, date_stamp.as_ref(), &self.stamp_style)
    }

    /// Run the pipeline on a blocking worker, off the async runtime threads
    ///
    /// If styling or compositing panics the upright frame is returned
    /// without the film look.
    pub async fn process_async(
        self: Arc<Self>,
        frame: CapturedFrame,
        request: ProcessingRequest,
    ) -> RgbaImage {
        let (width, height) = (frame.width, frame.height);
        info!(
            width,
            height,
            style = %request.style(),
            "Starting film processing"
        );

        let worker = tokio::task::spawn_blocking(move || {
            let captured_at = frame.captured_at;
            let upright = orientation::normalize(frame);
            let finished = panic::catch_unwind(AssertUnwindSafe(|| {
                self.finish(&upright, &captured_at, &request)
            }));
            match finished {
                Ok(image) => image,
                Err(_) => {
                    error!(
                        style = %request.style(),
                        "Film processing failed, keeping the upright frame"
                    );
                    upright
                }
            }
        });

        match worker.await {
            Ok(image) => image,
            Err(e) => {
                error!(error = %e, "Processing worker failed, producing blank frame");
                RgbaImage::new(width, height)
            }
        }
    }
}

impl Default for PhotoPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::Orientation;
    use image::Rgba;

    fn frame(orientation: Orientation) -> CapturedFrame {
        let image = RgbaImage::from_fn(12, 8, |x, y| Rgba([(x * 20) as u8, (y * 30) as u8, 90, 255]));
        CapturedFrame::from_rgba(image, orientation, Local::now())
    }

    #[test]
    fn test_plain_request_is_style_only() {
        let pipeline = PhotoPipeline::new();
        let request = ProcessingRequest::new(FilmStyle::Fuji);
        let source = frame(Orientation::Normal);
        let expected = apply_style(&orientation::normalize(source.clone()), FilmStyle::Fuji);
        assert_eq!(pipeline.process(source, &request), expected);
    }

    #[test]
    fn test_output_is_upright() {
        let pipeline = PhotoPipeline::new();
        let request = ProcessingRequest::new(FilmStyle::Unknown);
        let output = pipeline.process(frame(Orientation::Rotate270), &request);
        assert_eq!(output.dimensions(), (8, 12));
    }

    #[test]
    fn test_missing_texture_passes_through() {
        let without_texture = PhotoPipeline::with_overlays(None, DateStampStyle::default());
        let request = ProcessingRequest::new(FilmStyle::Kodak).with_light_leak(0.8);
        let plain = ProcessingRequest::new(FilmStyle::Kodak);
        assert_eq!(
            without_texture.process(frame(Orientation::Normal), &request),
            without_texture.process(frame(Orientation::Normal), &plain)
        );
    }

    #[tokio::test]
    async fn test_process_async_matches_sync() {
        let pipeline = Arc::new(PhotoPipeline::new());
        let request = ProcessingRequest::new(FilmStyle::Kodak)
            .with_light_leak(0.5)
            .with_date_stamp(true);
        let source = frame(Orientation::Normal);
        let expected = pipeline.process(source.clone(), &request);
        let actual = pipeline.clone().process_async(source, request).await;
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_config_stamp_scale_is_clamped() {
        let config = Config {
            date_stamp_scale: 50_000_000,
            date_stamp_inset: 8,
            ..Config::default()
        };
        let pipeline = PhotoPipeline::from_config(&config);
        assert_eq!(
            pipeline.stamp_style(),
            &DateStampStyle {
                scale: crate::constants::overlay::MAX_DATE_STAMP_SCALE,
                inset: 8,
            }
        );

        let request = ProcessingRequest::new(FilmStyle::Normal).with_date_stamp(true);
        let output = pipeline.process(frame(Orientation::Normal), &request);
        assert_eq!(output.dimensions(), (12, 8));
    }
}
