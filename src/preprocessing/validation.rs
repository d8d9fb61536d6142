//! # Improvement Validation
//!
//! Decides whether an enhanced candidate is worth keeping by comparing its quality
//! metrics with the original's. Contrast must go up, and sharpness may not drop by
//! more than the configured tolerance. Noise amplification shows up as a Laplacian
//! variance that changes with no contrast gain, and edge blurring as a sharpness
//! collapse; both are rejected.

use super::types::{ImprovementVerdict, QualityMetrics};
use crate::config::ValidationThresholds;

/// Compares the enhanced candidate's metrics against the original's.
///
/// Only contrast and sharpness participate; brightness is reported through the
/// quality assessment and does not gate acceptance.
///
/// # Examples
///
/// ```
/// use shelf_enhancer::config::ValidationThresholds;
/// use shelf_enhancer::preprocessing::{validate_improvement, QualityMetrics};
///
/// let original = QualityMetrics { contrast: 20.0, brightness: 120.0, sharpness: 50.0, needs_enhancement: true };
/// let enhanced = QualityMetrics { contrast: 45.0, brightness: 125.0, sharpness: 140.0, needs_enhancement: false };
///
/// let verdict = validate_improvement(&original, &enhanced, &ValidationThresholds::default());
/// assert!(verdict.improved);
/// assert_eq!(verdict.contrast_delta, 25.0);
/// ```
pub fn validate_improvement(
    original: &QualityMetrics,
    enhanced: &QualityMetrics,
    thresholds: &ValidationThresholds,
) -> ImprovementVerdict {
    let contrast_delta = enhanced.contrast - original.contrast;
    let sharpness_delta = enhanced.sharpness - original.sharpness;

    let contrast_gained = contrast_delta > thresholds.min_contrast_delta;
    let sharpness_kept = sharpness_delta > -thresholds.max_sharpness_loss;
    let improved = contrast_gained && sharpness_kept;

    tracing::debug!(
        target: "image_enhancement",
        contrast_delta,
        sharpness_delta,
        contrast_gained,
        sharpness_kept,
        improved,
        "Improvement validation completed"
    );

    ImprovementVerdict {
        original_contrast: original.contrast,
        enhanced_contrast: enhanced.contrast,
        contrast_delta,
        original_sharpness: original.sharpness,
        enhanced_sharpness: enhanced.sharpness,
        sharpness_delta,
        improved,
    }
}
