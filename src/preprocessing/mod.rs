//! # Image Preprocessing Module
//!
//! This module provides the building blocks of the enhancement decision engine.
//!
//! The module is organized into focused sub-modules:
//! - `input`: Validation of decoded pixel buffers at the engine boundary
//! - `quality`: Contrast, brightness and sharpness measurement
//! - `working_space`: Reversible luminance/chroma split
//! - `clahe`: Contrast Limited Adaptive Histogram Equalization on luminance
//! - `validation`: Acceptance test for enhanced candidates
//! - `types`: Shared records passed between the stages

pub mod clahe;
pub mod input;
pub mod quality;
pub mod types;
pub mod validation;
pub mod working_space;

// Re-export commonly used types and functions for convenience
pub use types::{
    ClaheImageResult, DecisionReason, ImprovementVerdict, PipelineState, ProcessingOutcome,
    QualityMetrics, Technique,
};

// Re-export main functions from sub-modules
pub use clahe::{apply_clahe, equalize_luminance};
pub use input::{image_from_raw, validate_image};
pub use quality::{assess_image_quality, needs_enhancement};
pub use validation::validate_improvement;
pub use working_space::{srgb_to_lab, Lab, WorkingSpace};
