//! # Enhancement Error Types
//!
//! This module defines the error taxonomy of the enhancement engine. Only malformed
//! input, a broken transform step, bad configuration or an exceeded deadline are
//! errors. Skipping or rejecting an enhancement is a successful outcome.

use std::fmt;

/// Errors raised by the enhancement engine
#[derive(Debug, Clone, PartialEq)]
pub enum EnhancementError {
    /// Zero-dimension image, unsupported layout, corrupt or empty pixel buffer
    InvalidInput(String),
    /// The contrast transform could not execute
    EnhancementFailure(String),
    /// Thresholds or parameters outside their valid ranges
    Configuration(String),
    /// The caller-imposed wall-clock limit was exceeded
    Timeout(String),
}

impl EnhancementError {
    /// Stable machine-readable kind, stored in the error-detail field of failed jobs
    pub fn kind(&self) -> &'static str {
        match self {
            EnhancementError::InvalidInput(_) => "invalid_input",
            EnhancementError::EnhancementFailure(_) => "enhancement_failure",
            EnhancementError::Configuration(_) => "configuration_error",
            EnhancementError::Timeout(_) => "timeout",
        }
    }

    /// Whether the failure was caused by the submitted image rather than the engine
    pub fn is_input_error(&self) -> bool {
        matches!(self, EnhancementError::InvalidInput(_))
    }
}

impl fmt::Display for EnhancementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnhancementError::InvalidInput(msg) => write!(f, "[INVALID_INPUT] {}", msg),
            EnhancementError::EnhancementFailure(msg) => {
                write!(f, "[ENHANCEMENT_FAILURE] {}", msg)
            }
            EnhancementError::Configuration(msg) => write!(f, "[CONFIG] {}", msg),
            EnhancementError::Timeout(msg) => write!(f, "[TIMEOUT] {}", msg),
        }
    }
}

impl std::error::Error for EnhancementError {}

impl From<anyhow::Error> for EnhancementError {
    fn from(err: anyhow::Error) -> Self {
        EnhancementError::EnhancementFailure(err.to_string())
    }
}

impl From<image::ImageError> for EnhancementError {
    fn from(err: image::ImageError) -> Self {
        EnhancementError::InvalidInput(err.to_string())
    }
}

/// Result type alias for convenience
pub type EnhancementResult<T> = Result<T, EnhancementError>;

/// Structured error logging shared by the pipeline and its callers
pub mod error_logging {
    use tracing::error;

    /// Log a failed enhancement run with the stage it failed in
    pub fn log_processing_failed(
        error: &super::EnhancementError,
        stage: &str,
        image_id: Option<&str>,
    ) {
        error!(
            error = %error,
            error_kind = error.kind(),
            stage = %stage,
            image_id = ?image_id,
            "Image enhancement failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            "Configuration error"
        );
    }
}
