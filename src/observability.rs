//! Observability module for centralized logging and metrics setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Metrics collection through the `metrics` facade with a Prometheus recorder
//! - Spans and metric helpers for enhancement decisions

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::prelude::*;

use crate::errors::EnhancementError;
use crate::observability_config::ObservabilityConfig;
use crate::preprocessing::ProcessingOutcome;

/// Initialize the complete observability stack
pub fn init_observability() -> Result<Option<PrometheusHandle>> {
    let config = ObservabilityConfig::from_env();
    init_observability_with_config(config)
}

/// Initialize the complete observability stack with custom configuration.
///
/// Returns the Prometheus handle when metrics are enabled; the hosting service
/// renders it on its own endpoint.
pub fn init_observability_with_config(
    config: ObservabilityConfig,
) -> Result<Option<PrometheusHandle>> {
    // Validate configuration
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    // Initialize tracing first
    init_tracing_with_config(&config)?;

    let metrics_handle = if config.enable_metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    tracing::info!(
        environment = %config.environment,
        metrics_enabled = %config.enable_metrics,
        "Observability stack initialized successfully"
    );
    Ok(metrics_handle)
}

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    // RUST_LOG still wins for anything it names
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("shelf_enhancer={}", config.log_level).parse()?)
        .add_directive(format!("image_enhancement={}", config.log_level).parse()?);

    // Pretty formatting for development, JSON for everything else
    if config.is_development() && config.use_pretty_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        log_format = %config.log_format,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Initialize metrics collection with the Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    tracing::info!("Metrics collection initialized");
    Ok(handle)
}

/// Create a span wrapping one enhancement decision
pub fn enhancement_span(image_id: &str) -> tracing::Span {
    tracing::info_span!(
        "enhancement_decision",
        image_id = image_id,
        component = "image_enhancement"
    )
}

/// Record the metrics of a completed decision
pub fn record_outcome_metrics(outcome: &ProcessingOutcome) {
    metrics::counter!("enhancement_decisions_total", "decision" => outcome.decision()).increment(1);
    metrics::histogram!("enhancement_duration_seconds").record(outcome.processing_time_ms / 1000.0);

    let quality = &outcome.quality_assessment;
    metrics::histogram!("image_contrast").record(quality.contrast);
    metrics::histogram!("image_brightness").record(quality.brightness);
    metrics::histogram!("image_sharpness").record(quality.sharpness);

    if let Some(verdict) = &outcome.improvement_analysis {
        metrics::histogram!("enhancement_contrast_delta").record(verdict.contrast_delta);
    }
}

/// Record a failed decision by error kind
pub fn record_failure_metrics(error: &EnhancementError) {
    metrics::counter!("enhancement_failures_total", "kind" => error.kind()).increment(1);
}
