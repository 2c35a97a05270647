// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use filmcam::constants::{file_formats, film, overlay};
use filmcam::pipelines::photo::{FilmStyle, FilterStage};

fn triple(controls: film::ColorControls) -> (f32, f32, f32) {
    (controls.contrast, controls.saturation, controls.brightness)
}

#[test]
fn test_style_color_controls() {
    assert_eq!(
        triple(film::NORMAL_CONTROLS),
        (1.05, 1.0, 0.0)
    );
    assert_eq!(
        triple(film::KODAK_CONTROLS),
        (1.15, 1.2, 0.05)
    );
    assert_eq!(
        triple(film::FUJI_CONTROLS),
        (0.95, 1.05, -0.02)
    );
    assert!(film::ColorControls::IDENTITY.is_identity());
}

#[test]
fn test_color_controls_come_before_finishing_stages() {
    for style in FilmStyle::ALL {
        let stages = style.stages();
        let controls = stages
            .iter()
            .position(|s| matches!(s, FilterStage::ColorControls(_)))
            .expect("every style adjusts contrast, saturation and brightness");
        for stage in &stages[controls + 1..] {
            assert!(matches!(
                stage,
                FilterStage::Sharpen { .. }
                    | FilterStage::HighlightShadow { .. }
                    | FilterStage::Temperature { .. }
            ));
        }
    }
}

#[test]
fn test_unknown_style_has_no_finishing_stage() {
    let stages = FilmStyle::Unknown.stages();
    assert_eq!(stages.len(), 1);
    assert!(matches!(stages[0], FilterStage::ColorControls(c) if c.is_identity()));
}

#[test]
fn test_overlay_defaults() {
    assert_eq!(overlay::LIGHT_LEAK_TEXTURE_SIZE, 512);
    assert!((0.0..=1.0).contains(&overlay::DEFAULT_LIGHT_LEAK_INTENSITY));
    assert_eq!(overlay::DATE_STAMP_FORMAT, "%Y-%m-%d %H:%M");
}

#[test]
fn test_image_extensions() {
    assert!(file_formats::is_image_extension("JPG"));
    assert!(file_formats::is_image_extension("png"));
    assert!(!file_formats::is_image_extension("mp4"));
}
