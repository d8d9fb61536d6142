//! # Bounded Execution
//!
//! Async wrapper that runs the synchronous decision pipeline on Tokio's blocking
//! pool under a wall-clock deadline.

use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use tracing::{warn, Instrument};

use crate::errors::{EnhancementError, EnhancementResult};
use crate::observability::record_failure_metrics;
use crate::pipeline::SmartEnhancer;
use crate::preprocessing::ProcessingOutcome;

/// Runs `enhancer.process` on the blocking pool, failing with
/// `EnhancementError::Timeout` once `timeout` has elapsed.
///
/// The current span follows the work onto the blocking thread. A panicking
/// worker is reported as `EnhancementError::EnhancementFailure`.
pub async fn process_with_timeout(
    enhancer: Arc<SmartEnhancer>,
    image: DynamicImage,
    timeout: Duration,
) -> EnhancementResult<ProcessingOutcome> {
    let span = tracing::Span::current();
    let task = tokio::task::spawn_blocking(move || span.in_scope(|| enhancer.process(&image)));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            let error = EnhancementError::EnhancementFailure(format!(
                "enhancement worker did not complete: {}",
                join_error
            ));
            record_failure_metrics(&error);
            Err(error)
        }
        Err(_) => {
            let error = EnhancementError::Timeout(format!(
                "processing exceeded {} ms",
                timeout.as_millis()
            ));
            warn!(timeout_ms = timeout.as_millis() as u64, "Image enhancement timed out");
            record_failure_metrics(&error);
            Err(error)
        }
    }
}

/// Same as [`process_with_timeout`] with the enhancer's configured deadline,
/// inside an `enhancement_decision` span for `image_id`.
pub async fn process_image(
    enhancer: Arc<SmartEnhancer>,
    image: DynamicImage,
    image_id: &str,
) -> EnhancementResult<ProcessingOutcome> {
    let timeout = enhancer.timeout();
    process_with_timeout(enhancer, image, timeout)
        .instrument(crate::observability::enhancement_span(image_id))
        .await
}
