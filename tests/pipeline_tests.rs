//! # Decision Pipeline Tests
//!
//! End-to-end behaviour of the assess → enhance → validate decision on
//! synthetic images with known statistics.

mod test_helpers;

#[cfg(test)]
mod tests {
    use crate::test_helpers::*;
    use image::{DynamicImage, GrayImage};
    use shelf_enhancer::config::{PipelineConfig, QualityThresholds, ValidationThresholds};
    use shelf_enhancer::errors::EnhancementError;
    use shelf_enhancer::pipeline::{process_smart_enhancement, SmartEnhancer};
    use shelf_enhancer::preprocessing::{
        apply_clahe, assess_image_quality, image_from_raw, srgb_to_lab, validate_improvement,
        DecisionReason, QualityMetrics, Technique,
    };

    fn default_enhancer() -> SmartEnhancer {
        SmartEnhancer::new(PipelineConfig::default()).expect("default config is valid")
    }

    #[test]
    fn test_assessment_is_idempotent() {
        let thresholds = QualityThresholds::default();

        for image in [
            low_contrast_color(90, 70),
            noise_gray(64, 48, 0, 255, 7),
            well_exposed_gray(),
        ] {
            let first = assess_image_quality(&image, &thresholds).unwrap();
            let second = assess_image_quality(&image, &thresholds).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_well_exposed_image_is_returned_unmodified() {
        let image = well_exposed_gray();
        let metrics = assess_image_quality(&image, &QualityThresholds::default()).unwrap();

        assert!((metrics.contrast - 80.0).abs() < 1e-9);
        assert!((metrics.brightness - 128.0).abs() < 1e-9);
        assert!((metrics.sharpness - 149.707).abs() < 0.01);
        assert!(!metrics.needs_enhancement);

        let outcome = default_enhancer().process(&image).unwrap();
        assert!(!outcome.enhancement_applied);
        assert_eq!(outcome.technique_used, Technique::None);
        assert_eq!(outcome.reason, DecisionReason::ImageQualityAlreadyGood);
        assert!(outcome.improvement_analysis.is_none());
        assert_eq!(outcome.output_image, image);
    }

    #[test]
    fn test_low_contrast_image_triggers_enhancement() {
        let image = low_contrast_gray(256, 256);
        let config = PipelineConfig::default();

        let original = assess_image_quality(&image, &config.quality).unwrap();
        assert!(original.needs_enhancement);

        let candidate = apply_clahe(&image, &config.enhancement).unwrap();
        let enhanced = assess_image_quality(&candidate.image, &config.quality).unwrap();
        assert!(
            enhanced.contrast > original.contrast,
            "candidate contrast {:.2} should exceed original {:.2}",
            enhanced.contrast,
            original.contrast
        );

        let outcome = process_smart_enhancement(&image, &config).unwrap();
        assert!(outcome.enhancement_applied);
        assert_eq!(outcome.technique_used, Technique::Clahe);
        assert_eq!(outcome.reason, DecisionReason::EnhancementImproved);
        assert!(outcome.improvement_analysis.unwrap().improved);
        assert_ne!(outcome.output_image, image);
    }

    #[test]
    fn test_output_never_loses_contrast() {
        let enhancer = default_enhancer();
        let thresholds = QualityThresholds::default();

        let images = [
            low_contrast_gray(120, 80),
            low_contrast_color(64, 64),
            flat_gray(40, 40, 0),
            flat_gray(40, 40, 128),
            flat_gray(40, 40, 255),
            noise_gray(96, 96, 0, 255, 1),
            noise_gray(96, 96, 100, 110, 2),
            dark_gray(100, 60),
            gradient_gray(128, 32),
            well_exposed_gray(),
        ];

        for image in &images {
            let outcome = enhancer.process(image).unwrap();
            let output = assess_image_quality(&outcome.output_image, &thresholds).unwrap();
            assert!(
                output.contrast >= outcome.quality_assessment.contrast,
                "output contrast {:.3} below original {:.3}",
                output.contrast,
                outcome.quality_assessment.contrast
            );

            // Invariant linking the three outcome fields
            if outcome.enhancement_applied {
                assert_eq!(outcome.technique_used, Technique::Clahe);
                assert!(outcome.improvement_analysis.unwrap().improved);
            } else {
                assert_eq!(outcome.technique_used, Technique::None);
                assert_eq!(&outcome.output_image, image);
            }
        }
    }

    #[test]
    fn test_flat_image_is_measured_without_error() {
        let outcome = default_enhancer().process(&flat_gray(50, 50, 90)).unwrap();

        assert_eq!(outcome.quality_assessment.contrast, 0.0);
        assert_eq!(outcome.quality_assessment.sharpness, 0.0);
        assert!(outcome.quality_assessment.needs_enhancement);
        // Equalizing a flat image cannot raise its contrast
        assert!(!outcome.enhancement_applied);
        assert_eq!(outcome.reason, DecisionReason::EnhancementNotImproved);
    }

    #[test]
    fn test_color_image_keeps_its_chroma() {
        let image = low_contrast_color(128, 128);
        let outcome = default_enhancer().process(&image).unwrap();
        assert!(outcome.enhancement_applied, "colour test image should be enhanced");

        let input = image.to_rgb8();
        let output = outcome.output_image.to_rgb8();

        let mut compared = 0usize;
        let mut lightness_changed = false;
        for (before, after) in input.pixels().zip(output.pixels()) {
            // Clipped channels cannot carry the original chroma
            if after.0.iter().any(|&c| !(3..=252).contains(&c)) {
                continue;
            }
            compared += 1;

            let lab_before = srgb_to_lab(before.0);
            let lab_after = srgb_to_lab(after.0);
            assert!(
                (lab_before.a - lab_after.a).abs() < 3.0 && (lab_before.b - lab_after.b).abs() < 3.0,
                "chroma drifted: {:?} -> {:?}",
                lab_before,
                lab_after
            );
            if (lab_before.l - lab_after.l).abs() > 1.0 {
                lightness_changed = true;
            }
        }

        assert!(compared > (input.width() * input.height()) as usize * 9 / 10);
        assert!(lightness_changed);
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let enhancer = default_enhancer();

        for image in [
            DynamicImage::ImageLuma8(GrayImage::new(0, 0)),
            DynamicImage::ImageLuma8(GrayImage::new(0, 10)),
            DynamicImage::ImageRgb8(image::RgbImage::new(10, 0)),
        ] {
            assert!(matches!(
                enhancer.process(&image),
                Err(EnhancementError::InvalidInput(_))
            ));
        }

        assert!(matches!(
            image_from_raw(0, 0, 3, Vec::new()),
            Err(EnhancementError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unsupported_layout_is_invalid_input() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(8, 8));
        assert!(matches!(
            default_enhancer().process(&rgba),
            Err(EnhancementError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_marginal_gain_is_rejected() {
        let config = PipelineConfig {
            validation: ValidationThresholds {
                min_contrast_delta: 1000.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let image = low_contrast_color(96, 64);
        let outcome = process_smart_enhancement(&image, &config).unwrap();

        let verdict = outcome.improvement_analysis.expect("enhancer ran");
        assert!(!verdict.improved);
        assert!(verdict.contrast_delta > 0.0);
        assert!(!outcome.enhancement_applied);
        assert_eq!(outcome.reason, DecisionReason::EnhancementNotImproved);
        assert_eq!(outcome.output_image, image);
    }

    #[test]
    fn test_sharpness_loss_is_rejected() {
        let original = QualityMetrics {
            contrast: 25.0,
            brightness: 120.0,
            sharpness: 400.0,
            needs_enhancement: true,
        };
        let blurred = QualityMetrics {
            contrast: 60.0,
            brightness: 122.0,
            sharpness: 250.0,
            needs_enhancement: false,
        };

        let verdict = validate_improvement(&original, &blurred, &ValidationThresholds::default());
        assert!(verdict.contrast_delta > 1.0);
        assert!(!verdict.improved);
    }

    #[test]
    fn test_every_outcome_carries_metrics() {
        let enhancer = default_enhancer();

        for image in [
            well_exposed_gray(),
            low_contrast_gray(64, 64),
            flat_gray(16, 16, 200),
        ] {
            let outcome = enhancer.process(&image).unwrap();
            assert!(outcome.processing_time_ms >= 0.0);
            assert!(outcome.quality_assessment.contrast.is_finite());

            let json = serde_json::to_value(outcome.metadata()).unwrap();
            assert!(json["quality_assessment"].is_object());
            assert!(json["processing_time_ms"].as_f64().unwrap() >= 0.0);
            assert_eq!(json["processor_version"], "2.0.0");
            assert_eq!(json["processing_approach"], "research_proven_clahe");
        }
    }

    #[test]
    fn test_noise_images_are_processed() {
        let enhancer = default_enhancer();

        let loud = noise_gray(128, 128, 0, 255, 42);
        let outcome = enhancer.process(&loud).unwrap();
        // Full-range noise has plenty of contrast and edge energy
        assert!(!outcome.quality_assessment.needs_enhancement);
        assert_eq!(outcome.output_image, loud);

        let quiet = noise_gray(128, 128, 100, 110, 42);
        let first = enhancer.process(&quiet).unwrap();
        let second = enhancer.process(&quiet).unwrap();
        assert_eq!(first.output_image, second.output_image);
        assert_eq!(first.improvement_analysis, second.improvement_analysis);
    }

    #[test]
    fn test_concurrent_calls_share_one_enhancer() {
        let enhancer = default_enhancer();
        let images: Vec<DynamicImage> = (0..4)
            .map(|i| noise_gray(80, 60, 90, 120, i))
            .collect();

        let sequential: Vec<_> = images
            .iter()
            .map(|image| enhancer.process(image).unwrap())
            .collect();

        let parallel: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = images
                .iter()
                .map(|image| scope.spawn(|| enhancer.process(image).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (a, b) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(a.output_image, b.output_image);
            assert_eq!(a.quality_assessment, b.quality_assessment);
            assert_eq!(a.improvement_analysis, b.improvement_analysis);
        }
    }

    #[test]
    fn test_custom_thresholds_change_the_gate() {
        // A contrast floor above the image's own contrast forces it through the enhancer
        let strict = PipelineConfig {
            quality: QualityThresholds {
                contrast_min: 100.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let outcome = process_smart_enhancement(&well_exposed_gray(), &strict).unwrap();
        assert!(outcome.quality_assessment.needs_enhancement);
        assert!(outcome.improvement_analysis.is_some());
    }
}
