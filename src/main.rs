use anyhow::{Context, Result};
use image::DynamicImage;
use shelf_enhancer::config::PipelineConfig;
use shelf_enhancer::errors::{error_logging, EnhancementError};
use shelf_enhancer::metadata::FailureMetadata;
use shelf_enhancer::observability;
use shelf_enhancer::pipeline::SmartEnhancer;
use shelf_enhancer::runtime;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const USAGE: &str = "Usage: shelf-enhancer <input-image> <output-image> [metadata.json]";

struct CliArgs {
    input: PathBuf,
    output: PathBuf,
    metadata: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = env::args_os().skip(1);

    let input = args.next().map(PathBuf::from).context(USAGE)?;
    let output = args.next().map(PathBuf::from).context(USAGE)?;
    let metadata = args.next().map(PathBuf::from);

    if args.next().is_some() {
        anyhow::bail!(USAGE);
    }

    Ok(CliArgs {
        input,
        output,
        metadata,
    })
}

/// Decodes the input and converts it to 8-bit gray or 8-bit RGB
fn load_image(path: &Path) -> Result<DynamicImage, EnhancementError> {
    let image = image::open(path)?;

    Ok(match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        other if !other.color().has_color() => DynamicImage::ImageLuma8(other.to_luma8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    })
}

fn report_failure(error: &EnhancementError, stage: &str) -> Result<()> {
    let failure = FailureMetadata::from_error(error, stage);
    println!("{}", serde_json::to_string_pretty(&failure)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = parse_args()?;

    // Initialize logging and the metrics recorder
    let _metrics_handle = observability::init_observability()?;

    let config = PipelineConfig::from_env().inspect_err(|e| {
        error_logging::log_config_error(e, "pipeline");
    })?;
    info!("{}", config.summary());

    let enhancer = Arc::new(SmartEnhancer::new(config)?);

    let image_id = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.input.display().to_string());

    let image = match load_image(&args.input) {
        Ok(image) => image,
        Err(error) => {
            error_logging::log_processing_failed(&error, "decoding", Some(&image_id));
            report_failure(&error, "decoding")?;
            std::process::exit(1);
        }
    };

    let outcome = match runtime::process_image(enhancer, image, &image_id).await {
        Ok(outcome) => outcome,
        Err(error) => {
            report_failure(&error, "processing")?;
            std::process::exit(1);
        }
    };

    outcome
        .output_image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let metadata = serde_json::to_string_pretty(&outcome.metadata())?;
    match &args.metadata {
        Some(path) => std::fs::write(path, metadata)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", metadata),
    }

    info!(
        image_id = %image_id,
        output = %args.output.display(),
        decision = outcome.decision(),
        "Enhanced image written"
    );
    Ok(())
}
