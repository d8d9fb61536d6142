//! # Processing Metadata
//!
//! Serialisable records handed to the service layer: the decision record of a
//! successful run and the error-detail record of a failed one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EnhancementParameters;
use crate::errors::EnhancementError;
use crate::preprocessing::{
    DecisionReason, ImprovementVerdict, ProcessingOutcome, QualityMetrics, Technique,
};

/// Version reported in every metadata record
pub const PROCESSOR_VERSION: &str = "2.0.0";

/// Name of the decision approach reported in every metadata record
pub const PROCESSING_APPROACH: &str = "research_proven_clahe";

/// CLAHE parameters as they appear in metadata (`grid_size` written `"8x8"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaheParametersRecord {
    pub clip_limit: f64,
    pub grid_size: String,
}

impl From<&EnhancementParameters> for ClaheParametersRecord {
    fn from(params: &EnhancementParameters) -> Self {
        Self {
            clip_limit: params.clip_limit,
            grid_size: params.tile_grid.to_string(),
        }
    }
}

/// Structured record of one successful decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    pub processor_version: String,
    pub processing_approach: String,
    /// Input dimensions written `"WxH"`
    pub original_size: String,
    pub enhancement_applied: bool,
    pub technique_used: Technique,
    pub reason: DecisionReason,
    pub quality_assessment: QualityMetrics,
    /// `null` when enhancement was skipped
    pub improvement_analysis: Option<ImprovementVerdict>,
    /// Present whenever the enhancer ran
    pub clahe_parameters: Option<ClaheParametersRecord>,
    pub processing_time_ms: f64,
    pub processed_at: DateTime<Utc>,
}

impl ProcessingOutcome {
    /// Builds the serialisable metadata record of this outcome
    pub fn metadata(&self) -> ProcessingMetadata {
        let (width, height) = self.original_dimensions;

        ProcessingMetadata {
            processor_version: PROCESSOR_VERSION.to_string(),
            processing_approach: PROCESSING_APPROACH.to_string(),
            original_size: format!("{}x{}", width, height),
            enhancement_applied: self.enhancement_applied,
            technique_used: self.technique_used,
            reason: self.reason,
            quality_assessment: self.quality_assessment,
            improvement_analysis: self.improvement_analysis,
            clahe_parameters: self.clahe_parameters.as_ref().map(ClaheParametersRecord::from),
            processing_time_ms: self.processing_time_ms,
            processed_at: Utc::now(),
        }
    }
}

/// Error-detail record stored by the service layer for a failed job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMetadata {
    pub error: String,
    pub error_kind: String,
    /// Pipeline state the failure happened in
    pub stage: String,
    pub processor_version: String,
    pub failed_at: DateTime<Utc>,
}

impl FailureMetadata {
    pub fn from_error(error: &EnhancementError, stage: &str) -> Self {
        Self {
            error: error.to_string(),
            error_kind: error.kind().to_string(),
            stage: stage.to_string(),
            processor_version: PROCESSOR_VERSION.to_string(),
            failed_at: Utc::now(),
        }
    }
}
