// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Processing an image file through the film pipeline
//! - Listing film styles
//! - Showing the effective configuration

use filmcam::app::{CaptureController, CaptureEvent, CaptureStatus};
use filmcam::backends::camera::FileCaptureDevice;
use filmcam::config::Config;
use filmcam::pipelines::photo::{EncodingFormat, FilmStyle, PhotoPipeline};
use filmcam::storage::DirectoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Overrides for a single `process` run
pub struct ProcessOptions {
    pub input: PathBuf,
    pub style: Option<String>,
    pub light_leak: Option<f32>,
    pub date_stamp: bool,
    pub iso: Option<f32>,
    pub shutter: Option<f64>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
}

/// Capture a photo from an image file and save it with the film look applied
pub fn process(options: ProcessOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config();
    apply_overrides(&mut config, &options)?;

    let output_dir = config.photo_directory();
    println!("Input: {}", options.input.display());
    println!("Style: {}", config.film_style);

    let device = Arc::new(FileCaptureDevice::new(&options.input));
    let store = Arc::new(DirectoryStore::new(&output_dir, config.encoder()));
    let pipeline = Arc::new(PhotoPipeline::from_config(&config));
    let request = config.processing_request();

    // Create async runtime for the controller
    let rt = tokio::runtime::Runtime::new()?;
    let status = rt.block_on(async {
        let (controller, mut events) = CaptureController::new(device, store, pipeline);
        let controller = controller.with_capture_timeout(config.capture_timeout());

        if controller.submit(request).is_none() {
            return None;
        }

        while let Some(event) = events.recv().await {
            match event {
                CaptureEvent::StateChanged(state) => println!("  {}", state),
                CaptureEvent::Completed(result) => {
                    if let Some(saved) = &result.saved {
                        println!(
                            "Photo saved: {} ({} bytes)",
                            saved.location.display(),
                            saved.bytes
                        );
                    }
                    return Some(result.status);
                }
            }
        }
        None
    });

    match status {
        Some(CaptureStatus::Success) => Ok(()),
        Some(status) => Err(status.to_string().into()),
        None => Err("Capture did not complete".into()),
    }
}

/// Print every film style and its processing stages
pub fn list_styles() -> Result<(), Box<dyn std::error::Error>> {
    println!("Film styles:");
    println!();
    for style in FilmStyle::ALL {
        let stages: Vec<&str> = style.stages().iter().map(|stage| stage.name()).collect();
        println!("  {:<8} {}", style.display_name(), stages.join(" → "));
    }
    Ok(())
}

/// Print the config file location and the effective settings
pub fn show_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config();
    match Config::default_path() {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (no config directory)"),
    }
    println!("Photo directory: {}", config.photo_directory().display());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    })
}

fn apply_overrides(
    config: &mut Config,
    options: &ProcessOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(style) = &options.style {
        config.film_style = FilmStyle::from_name(style);
        if config.film_style == FilmStyle::Unknown {
            warn!(style = %style, "Unknown film style, no film look will be applied");
        }
    }
    if let Some(intensity) = options.light_leak {
        config.light_leak_enabled = true;
        config.light_leak_intensity = intensity;
    }
    if options.date_stamp {
        config.date_stamp_enabled = true;
    }
    match (options.iso, options.shutter) {
        (Some(iso), Some(shutter)) => {
            config.manual_exposure_enabled = true;
            config.iso = iso;
            config.shutter_seconds = shutter;
        }
        (None, None) => {}
        _ => return Err("--iso and --shutter must be given together".into()),
    }
    if let Some(output) = &options.output {
        config.photo_directory = Some(output.clone());
    }
    if let Some(format) = &options.format {
        config.output_format = EncodingFormat::from_name(format)
            .ok_or_else(|| format!("Unsupported output format: {}", format))?;
    }
    Ok(())
}
