//! # Shelf Enhancer
//!
//! Contrast-enhancement decision engine for shelf and document photographs
//! headed for text extraction. Each image is assessed, enhanced with CLAHE on
//! its luminance only when it needs it, and the enhanced candidate is kept only
//! when it measurably improves contrast without losing sharpness.

pub mod config;
pub mod errors;
pub mod metadata;
pub mod observability;
pub mod observability_config;
pub mod pipeline;
pub mod preprocessing;
pub mod runtime;

// Re-export types for easier access
pub use config::{
    EnhancementParameters, PipelineConfig, QualityThresholds, TileGrid, ValidationThresholds,
};
pub use errors::{EnhancementError, EnhancementResult};
pub use metadata::{FailureMetadata, ProcessingMetadata};
pub use pipeline::{process_smart_enhancement, SmartEnhancer};
pub use preprocessing::{ImprovementVerdict, ProcessingOutcome, QualityMetrics};
