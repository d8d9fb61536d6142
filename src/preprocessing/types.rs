//! # Shared Types for Image Enhancement
//!
//! This module contains the records passed between the assessor, the enhancer,
//! the validator and the orchestrator. All of them are transient and scoped to a
//! single invocation.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::config::{EnhancementParameters, TileGrid};

/// Closed-form quality measurements of an image's luminance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Standard deviation of luminance samples
    pub contrast: f64,
    /// Mean luminance
    pub brightness: f64,
    /// Variance of the Laplacian response over luminance
    pub sharpness: f64,
    /// True iff any metric falls outside its acceptable band
    pub needs_enhancement: bool,
}

/// Comparison of the enhanced candidate against its source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImprovementVerdict {
    pub original_contrast: f64,
    pub enhanced_contrast: f64,
    /// `enhanced_contrast - original_contrast`
    pub contrast_delta: f64,
    pub original_sharpness: f64,
    pub enhanced_sharpness: f64,
    /// `enhanced_sharpness - original_sharpness`
    pub sharpness_delta: f64,
    /// Whether the candidate should replace the original
    pub improved: bool,
}

/// Enhancement technique recorded in the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Technique {
    #[serde(rename = "CLAHE")]
    Clahe,
    #[serde(rename = "none")]
    None,
}

impl Technique {
    pub fn as_str(&self) -> &'static str {
        match self {
            Technique::Clahe => "CLAHE",
            Technique::None => "none",
        }
    }
}

/// Why the orchestrator settled on its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Every metric was already inside its band; the enhancer never ran
    ImageQualityAlreadyGood,
    /// The enhancer ran and its output passed validation
    EnhancementImproved,
    /// The enhancer ran but its output was rejected
    EnhancementNotImproved,
}

/// States of the decision state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Assessing,
    Enhancing,
    Validating,
    Done,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Assessing => "assessing",
            PipelineState::Enhancing => "enhancing",
            PipelineState::Validating => "validating",
            PipelineState::Done => "done",
        }
    }
}

/// Result of CLAHE contrast enhancement operation.
#[derive(Debug, Clone)]
pub struct ClaheImageResult {
    /// The contrast-enhanced image, in the input's channel layout
    pub image: DynamicImage,
    /// Clip limit used for histogram clipping
    pub clip_limit: f64,
    /// Tile grid requested by the caller
    pub tile_grid: TileGrid,
    /// Processing time in milliseconds
    pub processing_time_ms: f64,
}

/// Final artifact of one decision. Built once by the orchestrator, never mutated.
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    /// Either the untouched original or the accepted candidate
    pub output_image: DynamicImage,
    pub enhancement_applied: bool,
    pub technique_used: Technique,
    pub reason: DecisionReason,
    /// Metrics of the input image
    pub quality_assessment: QualityMetrics,
    /// Present whenever the enhancer ran, accepted or not
    pub improvement_analysis: Option<ImprovementVerdict>,
    /// Parameters the enhancer ran with, if it ran
    pub clahe_parameters: Option<EnhancementParameters>,
    /// Input dimensions (width, height)
    pub original_dimensions: (u32, u32),
    /// Wall-clock duration of the whole decision
    pub processing_time_ms: f64,
}

impl ProcessingOutcome {
    /// Short label of the decision, used for metrics and logs
    pub fn decision(&self) -> &'static str {
        match self.reason {
            DecisionReason::ImageQualityAlreadyGood => "skipped",
            DecisionReason::EnhancementImproved => "applied",
            DecisionReason::EnhancementNotImproved => "rejected",
        }
    }
}
