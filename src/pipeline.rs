//! # Smart Enhancement Pipeline
//!
//! The decision orchestrator. One call runs a short state machine:
//!
//! ```text
//! Assessing ──(quality good)──────────────────────────▶ Done (original)
//!     │
//!     └──(needs enhancement)──▶ Enhancing ──▶ Validating ──▶ Done (candidate or original)
//! ```
//!
//! Skipping and rejecting are successful outcomes. Only malformed input or a
//! broken transform is returned as an error, and it is never swallowed.

use std::time::{Duration, Instant};

use image::DynamicImage;

use crate::config::PipelineConfig;
use crate::errors::{error_logging, EnhancementResult};
use crate::observability::{record_failure_metrics, record_outcome_metrics};
use crate::preprocessing::{
    apply_clahe, assess_image_quality, validate_image, validate_improvement, DecisionReason,
    PipelineState, ProcessingOutcome, Technique,
};

/// Decision engine holding an immutable, validated configuration.
///
/// Cloning is cheap and every call is independent, so one instance can serve any
/// number of concurrent workers.
#[derive(Debug, Clone)]
pub struct SmartEnhancer {
    config: PipelineConfig,
}

impl SmartEnhancer {
    /// Creates an enhancer, rejecting invalid configuration up front.
    pub fn new(config: PipelineConfig) -> EnhancementResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Wall-clock budget configured for one call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.processing_timeout_secs)
    }

    /// Runs one enhancement decision on an in-memory image.
    ///
    /// # Errors
    ///
    /// * `EnhancementError::InvalidInput` for empty or unsupported images; the
    ///   enhancer is never reached
    /// * `EnhancementError::EnhancementFailure` when the contrast transform breaks
    pub fn process(&self, image: &DynamicImage) -> EnhancementResult<ProcessingOutcome> {
        let mut state = PipelineState::Assessing;

        match self.run(image, &mut state) {
            Ok(outcome) => {
                record_outcome_metrics(&outcome);
                Ok(outcome)
            }
            Err(error) => {
                error_logging::log_processing_failed(&error, state.as_str(), None);
                record_failure_metrics(&error);
                Err(error)
            }
        }
    }

    fn run(
        &self,
        image: &DynamicImage,
        state: &mut PipelineState,
    ) -> EnhancementResult<ProcessingOutcome> {
        let start_time = Instant::now();
        let original_dimensions = (image.width(), image.height());

        validate_image(image)?;

        // Assessing
        let quality = assess_image_quality(image, &self.config.quality)?;

        if !quality.needs_enhancement {
            transition(state, PipelineState::Done);
            let outcome = ProcessingOutcome {
                output_image: image.clone(),
                enhancement_applied: false,
                technique_used: Technique::None,
                reason: DecisionReason::ImageQualityAlreadyGood,
                quality_assessment: quality,
                improvement_analysis: None,
                clahe_parameters: None,
                original_dimensions,
                processing_time_ms: elapsed_ms(start_time),
            };
            log_decision(&outcome);
            return Ok(outcome);
        }

        // Enhancing
        transition(state, PipelineState::Enhancing);
        let candidate = apply_clahe(image, &self.config.enhancement)?;

        // Validating
        transition(state, PipelineState::Validating);
        let enhanced_quality = assess_image_quality(&candidate.image, &self.config.quality)?;
        let verdict = validate_improvement(&quality, &enhanced_quality, &self.config.validation);

        transition(state, PipelineState::Done);
        let (output_image, enhancement_applied, technique_used, reason) = if verdict.improved {
            (
                candidate.image,
                true,
                Technique::Clahe,
                DecisionReason::EnhancementImproved,
            )
        } else {
            (
                image.clone(),
                false,
                Technique::None,
                DecisionReason::EnhancementNotImproved,
            )
        };

        let outcome = ProcessingOutcome {
            output_image,
            enhancement_applied,
            technique_used,
            reason,
            quality_assessment: quality,
            improvement_analysis: Some(verdict),
            clahe_parameters: Some(self.config.enhancement),
            original_dimensions,
            processing_time_ms: elapsed_ms(start_time),
        };
        log_decision(&outcome);
        Ok(outcome)
    }
}

/// Runs one decision with a throwaway enhancer built from `config`.
pub fn process_smart_enhancement(
    image: &DynamicImage,
    config: &PipelineConfig,
) -> EnhancementResult<ProcessingOutcome> {
    SmartEnhancer::new(*config)?.process(image)
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!(
        target: "image_enhancement",
        from = state.as_str(),
        to = next.as_str(),
        "Pipeline state transition"
    );
    *state = next;
}

fn log_decision(outcome: &ProcessingOutcome) {
    tracing::info!(
        decision = outcome.decision(),
        enhancement_applied = outcome.enhancement_applied,
        technique = outcome.technique_used.as_str(),
        contrast = outcome.quality_assessment.contrast,
        brightness = outcome.quality_assessment.brightness,
        sharpness = outcome.quality_assessment.sharpness,
        contrast_delta = ?outcome.improvement_analysis.map(|v| v.contrast_delta),
        processing_time_ms = outcome.processing_time_ms,
        "Enhancement decision completed"
    );
}

fn elapsed_ms(start_time: Instant) -> f64 {
    start_time.elapsed().as_secs_f64() * 1000.0
}
