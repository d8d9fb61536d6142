//! # Pipeline Configuration
//!
//! This module gathers every tunable of the enhancement engine into one immutable
//! configuration value: quality thresholds, CLAHE parameters, the improvement
//! validator's tolerances and the processing deadline. Values can be loaded from
//! environment variables, validated once at load time and then shared freely
//! across concurrent invocations.

use crate::errors::{EnhancementError, EnhancementResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest accepted tile count along either axis
pub const MAX_TILE_GRID_DIM: u32 = 64;

/// Acceptable bands for the quality metrics. An image outside any band needs enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Contrast (luminance standard deviation) at or below this value is too flat
    pub contrast_min: f64,
    /// Mean luminance below this value is too dark
    pub brightness_min: f64,
    /// Mean luminance above this value is too bright
    pub brightness_max: f64,
    /// Laplacian variance at or below this value is too soft
    pub sharpness_min: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            contrast_min: 40.0,
            brightness_min: 20.0,
            brightness_max: 235.0,
            sharpness_min: 80.0,
        }
    }
}

impl QualityThresholds {
    /// Validate quality thresholds
    pub fn validate(&self) -> EnhancementResult<()> {
        for (name, value) in [
            ("contrast_min", self.contrast_min),
            ("brightness_min", self.brightness_min),
            ("brightness_max", self.brightness_max),
            ("sharpness_min", self.sharpness_min),
        ] {
            if !value.is_finite() {
                return Err(EnhancementError::Configuration(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }

        if self.contrast_min < 0.0 {
            return Err(EnhancementError::Configuration(format!(
                "contrast_min cannot be negative, got {}",
                self.contrast_min
            )));
        }

        if self.sharpness_min < 0.0 {
            return Err(EnhancementError::Configuration(format!(
                "sharpness_min cannot be negative, got {}",
                self.sharpness_min
            )));
        }

        if self.brightness_min < 0.0 || self.brightness_max > 255.0 {
            return Err(EnhancementError::Configuration(format!(
                "brightness band [{}, {}] must lie within [0, 255]",
                self.brightness_min, self.brightness_max
            )));
        }

        if self.brightness_min >= self.brightness_max {
            return Err(EnhancementError::Configuration(format!(
                "brightness_min ({}) must be lower than brightness_max ({})",
                self.brightness_min, self.brightness_max
            )));
        }

        Ok(())
    }
}

/// Number of contextual regions along each axis, written `rows x cols` (e.g. `8x8`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    pub rows: u32,
    pub cols: u32,
}

impl TileGrid {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(8, 8)
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for TileGrid {
    type Err = EnhancementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            EnhancementError::Configuration(format!(
                "Invalid tile grid '{}'. Expected format: 'ROWSxCOLS' (e.g. 8x8)",
                s
            ))
        };

        let (rows, cols) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;
        let cols = cols.trim().parse::<u32>().map_err(|_| invalid())?;

        Ok(Self { rows, cols })
    }
}

/// Fixed, research-derived CLAHE parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnhancementParameters {
    /// Histogram clip limit, as a multiple of the average bin population
    pub clip_limit: f64,
    /// Contextual region layout
    pub tile_grid: TileGrid,
}

impl Default for EnhancementParameters {
    fn default() -> Self {
        Self {
            clip_limit: 3.5,
            tile_grid: TileGrid::default(),
        }
    }
}

impl EnhancementParameters {
    /// Validate CLAHE parameters
    pub fn validate(&self) -> EnhancementResult<()> {
        if !self.clip_limit.is_finite() || self.clip_limit <= 0.0 {
            return Err(EnhancementError::Configuration(format!(
                "Invalid clip limit: {}. Must be > 0.0",
                self.clip_limit
            )));
        }

        let TileGrid { rows, cols } = self.tile_grid;
        if rows == 0 || cols == 0 {
            return Err(EnhancementError::Configuration(format!(
                "Invalid tile grid {}: dimensions must be > 0",
                self.tile_grid
            )));
        }

        if rows > MAX_TILE_GRID_DIM || cols > MAX_TILE_GRID_DIM {
            return Err(EnhancementError::Configuration(format!(
                "Invalid tile grid {}: dimensions cannot exceed {}",
                self.tile_grid, MAX_TILE_GRID_DIM
            )));
        }

        Ok(())
    }
}

/// Tolerances used to accept or reject an enhanced candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationThresholds {
    /// Contrast gain must be strictly greater than this
    pub min_contrast_delta: f64,
    /// Sharpness may drop by strictly less than this
    pub max_sharpness_loss: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_contrast_delta: 1.0,
            max_sharpness_loss: 30.0,
        }
    }
}

impl ValidationThresholds {
    /// Validate improvement tolerances
    pub fn validate(&self) -> EnhancementResult<()> {
        if !self.min_contrast_delta.is_finite() || self.min_contrast_delta < 0.0 {
            return Err(EnhancementError::Configuration(format!(
                "min_contrast_delta must be a non-negative number, got {}",
                self.min_contrast_delta
            )));
        }

        if !self.max_sharpness_loss.is_finite() || self.max_sharpness_loss < 0.0 {
            return Err(EnhancementError::Configuration(format!(
                "max_sharpness_loss must be a non-negative number, got {}",
                self.max_sharpness_loss
            )));
        }

        Ok(())
    }
}

/// Complete configuration of the decision engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub quality: QualityThresholds,
    pub enhancement: EnhancementParameters,
    pub validation: ValidationThresholds,
    /// Wall-clock budget for one `process` call when run through the runtime wrapper
    #[serde(default = "default_timeout_secs")]
    pub processing_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quality: QualityThresholds::default(),
            enhancement: EnhancementParameters::default(),
            validation: ValidationThresholds::default(),
            processing_timeout_secs: default_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> EnhancementResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> EnhancementResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_var(&lookup, "QUALITY_CONTRAST_MIN")? {
            config.quality.contrast_min = value;
        }
        if let Some(value) = parse_var(&lookup, "QUALITY_BRIGHTNESS_MIN")? {
            config.quality.brightness_min = value;
        }
        if let Some(value) = parse_var(&lookup, "QUALITY_BRIGHTNESS_MAX")? {
            config.quality.brightness_max = value;
        }
        if let Some(value) = parse_var(&lookup, "QUALITY_SHARPNESS_MIN")? {
            config.quality.sharpness_min = value;
        }
        if let Some(value) = parse_var(&lookup, "CLAHE_CLIP_LIMIT")? {
            config.enhancement.clip_limit = value;
        }
        if let Some(raw) = lookup("CLAHE_TILE_GRID") {
            config.enhancement.tile_grid = raw.parse().map_err(|_| {
                EnhancementError::Configuration(format!(
                    "CLAHE_TILE_GRID must look like '8x8', got '{}'",
                    raw
                ))
            })?;
        }
        if let Some(value) = parse_var(&lookup, "IMPROVEMENT_MIN_CONTRAST_DELTA")? {
            config.validation.min_contrast_delta = value;
        }
        if let Some(value) = parse_var(&lookup, "IMPROVEMENT_MAX_SHARPNESS_LOSS")? {
            config.validation.max_sharpness_loss = value;
        }
        if let Some(value) = parse_var(&lookup, "PROCESSING_TIMEOUT_SECS")? {
            config.processing_timeout_secs = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> EnhancementResult<()> {
        self.quality.validate()?;
        self.enhancement.validate()?;
        self.validation.validate()?;

        if self.processing_timeout_secs == 0 {
            return Err(EnhancementError::Configuration(
                "processing_timeout_secs cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: contrast_min={}, brightness=[{}, {}], sharpness_min={}, clip_limit={}, tile_grid={}, min_contrast_delta={}, max_sharpness_loss={}, timeout={}s",
            self.quality.contrast_min,
            self.quality.brightness_min,
            self.quality.brightness_max,
            self.quality.sharpness_min,
            self.enhancement.clip_limit,
            self.enhancement.tile_grid,
            self.validation.min_contrast_delta,
            self.validation.max_sharpness_loss,
            self.processing_timeout_secs
        )
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> EnhancementResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map(Some).map_err(|_| {
            EnhancementError::Configuration(format!("{} must be a valid number, got '{}'", key, raw))
        }),
        _ => Ok(None),
    }
}
