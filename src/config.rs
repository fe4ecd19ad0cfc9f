//! Pipeline configuration management.
//!
//! This module provides unified configuration for segmentation, windowing and
//! labeling, with serialization support so that a dataset can be rebuilt
//! exactly from the file that produced it.
//!
//! # Example
//!
//! ```ignore
//! use motion_dataset::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! config.save_toml("dataset.toml")?;
//!
//! let loaded = PipelineConfig::load_toml("dataset.toml")?;
//! let pipeline = Pipeline::from_config(loaded)?;
//! ```
//!
//! # TOML Layout
//!
//! ```toml
//! [segmentation]
//! gap_threshold_secs = 5.0
//!
//! [window]
//! duration_secs = 10.0
//! target_freq_hz = 30.0
//! min_coverage_fraction = 0.5
//!
//! [[labeling.rules]]
//! date = "2025-08-04"
//! start_time = "17:30:00"
//! end_time = "18:15:00"
//! category = "sleep"
//!
//! [quality]
//! very_small_dataset = 50
//! ```

use crate::error::{DatasetError, Result};
use crate::labeling::{LabelRule, LabelRuleSet};
use crate::validation::QualityConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Convert a duration in seconds to integer nanoseconds.
#[inline]
pub(crate) fn secs_to_nanos(secs: f64) -> i64 {
    (secs * NANOS_PER_SEC).round() as i64
}

/// Convert integer nanoseconds to seconds.
#[inline]
pub(crate) fn nanos_to_secs(nanos: i64) -> f64 {
    nanos as f64 / NANOS_PER_SEC
}

/// Unified pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Gap-based segmentation
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Window grid and resampling
    #[serde(default)]
    pub window: WindowConfig,

    /// Ground-truth label rules
    #[serde(default)]
    pub labeling: LabelingConfig,

    /// Advisory quality-check thresholds
    #[serde(default)]
    pub quality: QualityConfig,

    /// Experiment metadata (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExperimentMetadata>,
}

/// Segmentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Consecutive samples further apart than this start a new period (seconds)
    pub gap_threshold_secs: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            gap_threshold_secs: 5.0,
        }
    }
}

impl SegmentationConfig {
    /// Validate segmentation configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.gap_threshold_secs.is_finite() || self.gap_threshold_secs <= 0.0 {
            return Err(DatasetError::config(format!(
                "gap_threshold_secs must be > 0, got {}",
                self.gap_threshold_secs
            )));
        }
        Ok(())
    }
}

/// Window grid and resampling configuration.
///
/// Every emitted window holds exactly [`WindowConfig::target_samples`] rows,
/// whatever the raw sampling density was, as long as the candidate window
/// reached the coverage threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window length in seconds
    pub duration_secs: f64,

    /// Uniform rate every window is resampled to (Hz)
    pub target_freq_hz: f64,

    /// Fraction of `target_samples` a candidate must contain to be admitted
    pub min_coverage_fraction: f64,

    /// Process continuous periods on the rayon thread pool
    pub parallel_periods: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            target_freq_hz: 30.0,
            min_coverage_fraction: 0.5,
            parallel_periods: false,
        }
    }
}

impl WindowConfig {
    /// Create a window configuration with the default coverage fraction.
    pub fn new(duration_secs: f64, target_freq_hz: f64) -> Self {
        Self {
            duration_secs,
            target_freq_hz,
            ..Default::default()
        }
    }

    /// Set the minimum coverage fraction.
    pub fn with_min_coverage(mut self, fraction: f64) -> Self {
        self.min_coverage_fraction = fraction;
        self
    }

    /// Enable or disable parallel period processing.
    pub fn with_parallel_periods(mut self, enabled: bool) -> Self {
        self.parallel_periods = enabled;
        self
    }

    /// Rows per emitted window (`duration × frequency`, 300 by default).
    pub fn target_samples(&self) -> usize {
        (self.duration_secs * self.target_freq_hz).round() as usize
    }

    /// Window length in nanoseconds.
    pub fn duration_ns(&self) -> i64 {
        secs_to_nanos(self.duration_secs)
    }

    /// Raw sample count a candidate needs to be admitted.
    pub fn min_samples_required(&self) -> f64 {
        self.min_coverage_fraction * self.target_samples() as f64
    }

    /// Validate window configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(DatasetError::config(format!(
                "window duration_secs must be > 0, got {}",
                self.duration_secs
            )));
        }
        if !self.target_freq_hz.is_finite() || self.target_freq_hz <= 0.0 {
            return Err(DatasetError::config(format!(
                "target_freq_hz must be > 0, got {}",
                self.target_freq_hz
            )));
        }
        if !(self.min_coverage_fraction > 0.0 && self.min_coverage_fraction <= 1.0) {
            return Err(DatasetError::config(format!(
                "min_coverage_fraction must be in (0, 1], got {}",
                self.min_coverage_fraction
            )));
        }
        if self.target_samples() < 2 {
            return Err(DatasetError::config(format!(
                "duration_secs × target_freq_hz must give at least 2 samples, got {}",
                self.target_samples()
            )));
        }
        Ok(())
    }
}

/// Label rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Explicit category order; when absent, rule categories sorted by name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    /// Ordered rules, first match wins
    #[serde(default)]
    pub rules: Vec<LabelRule>,
}

impl LabelingConfig {
    /// Create a labeling configuration from ordered rules.
    pub fn new(rules: Vec<LabelRule>) -> Self {
        Self {
            categories: None,
            rules,
        }
    }

    /// Fix the category index order explicitly.
    pub fn with_categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Compile the rules into a rule set.
    pub fn compile(&self) -> Result<LabelRuleSet> {
        LabelRuleSet::compile(&self.rules, self.categories.as_deref())
    }

    /// Validate that every rule parses and names a known category.
    pub fn validate(&self) -> Result<()> {
        self.compile().map(|_| ())
    }
}

/// Experiment metadata for tracking and reproducibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    /// Experiment name
    pub name: String,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Recording device or subject identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Custom tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ExperimentMetadata {
    /// Create metadata with just a name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            device: None,
            tags: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set segmentation configuration.
    pub fn with_segmentation(mut self, config: SegmentationConfig) -> Self {
        self.segmentation = config;
        self
    }

    /// Set window configuration.
    pub fn with_window(mut self, config: WindowConfig) -> Self {
        self.window = config;
        self
    }

    /// Set labeling configuration.
    pub fn with_labeling(mut self, config: LabelingConfig) -> Self {
        self.labeling = config;
        self
    }

    /// Set quality-check thresholds.
    pub fn with_quality(mut self, config: QualityConfig) -> Self {
        self.quality = config;
        self
    }

    /// Set experiment metadata.
    pub fn with_metadata(mut self, metadata: ExperimentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.segmentation.validate()?;
        self.window.validate()?;
        self.labeling.validate()?;
        self.quality.validate()?;
        Ok(())
    }

    /// Save configuration to TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
