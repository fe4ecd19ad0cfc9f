//! Fluent builder for pipeline configuration.
//!
//! # Quick Start
//!
//! ```ignore
//! use motion_dataset::PipelineBuilder;
//!
//! // Defaults: 5 s gaps, 10 s windows at 30 Hz, 50% coverage
//! let pipeline = PipelineBuilder::new()
//!     .rule("2025-08-04", "17:30:00", "18:15:00", "sleep")
//!     .build()?;
//! ```
//!
//! # Samples Per Window
//!
//! `target_samples = round(duration_secs × target_freq_hz)`:
//!
//! | Duration | Frequency | Samples |
//! |----------|-----------|---------|
//! | 10 s | 30 Hz | 300 |
//! | 5 s | 50 Hz | 250 |
//! | 2.56 s | 50 Hz | 128 |

use crate::config::{
    ExperimentMetadata, LabelingConfig, PipelineConfig, SegmentationConfig, WindowConfig,
};
use crate::error::Result;
use crate::labeling::LabelRule;
use crate::pipeline::Pipeline;
use crate::validation::QualityConfig;

/// Fluent builder for [`PipelineConfig`] and [`Pipeline`].
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    segmentation: SegmentationConfig,
    window: WindowConfig,
    labeling: LabelingConfig,
    quality: QualityConfig,
    metadata: Option<ExperimentMetadata>,
}

impl PipelineBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            segmentation: config.segmentation,
            window: config.window,
            labeling: config.labeling,
            quality: config.quality,
            metadata: config.metadata,
        }
    }

    // =========================================================================
    // Segmentation and Windowing
    // =========================================================================

    /// Gap (seconds) above which a new continuous period starts.
    pub fn gap_threshold(mut self, secs: f64) -> Self {
        self.segmentation.gap_threshold_secs = secs;
        self
    }

    /// Window duration (seconds) and target resampling frequency (Hz).
    pub fn window(mut self, duration_secs: f64, target_freq_hz: f64) -> Self {
        self.window.duration_secs = duration_secs;
        self.window.target_freq_hz = target_freq_hz;
        self
    }

    /// Fraction of `target_samples` raw samples a window needs to be kept.
    pub fn min_coverage(mut self, fraction: f64) -> Self {
        self.window.min_coverage_fraction = fraction;
        self
    }

    /// Window periods in parallel.
    pub fn parallel_periods(mut self, enabled: bool) -> Self {
        self.window.parallel_periods = enabled;
        self
    }

    // =========================================================================
    // Labeling
    // =========================================================================

    /// Append a label rule. Earlier rules win on overlap.
    pub fn rule(mut self, date: &str, start_time: &str, end_time: &str, category: &str) -> Self {
        self.labeling
            .rules
            .push(LabelRule::new(date, start_time, end_time, category));
        self
    }

    /// Append several label rules in order.
    pub fn rules(mut self, rules: impl IntoIterator<Item = LabelRule>) -> Self {
        self.labeling.rules.extend(rules);
        self
    }

    /// Fix the category index order.
    pub fn categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.labeling = self.labeling.with_categories(categories);
        self
    }

    /// Thresholds for the advisory quality checks.
    pub fn quality(mut self, config: QualityConfig) -> Self {
        self.quality = config;
        self
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Set experiment name and description.
    pub fn experiment(mut self, name: &str, description: &str) -> Self {
        let mut metadata = ExperimentMetadata::new(name);
        metadata.description = Some(description.to_string());
        self.metadata = Some(metadata);
        self
    }

    /// Set experiment metadata with full control.
    pub fn with_metadata(mut self, metadata: ExperimentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Build and validate the configuration.
    pub fn build_config(self) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            segmentation: self.segmentation,
            window: self.window,
            labeling: self.labeling,
            quality: self.quality,
            metadata: self.metadata,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a ready-to-use pipeline.
    pub fn build(self) -> Result<Pipeline> {
        Pipeline::from_config(self.build_config()?)
    }

    /// Rows per window under the current settings.
    pub fn target_samples(&self) -> usize {
        self.window.target_samples()
    }

    /// Human-readable summary of the current settings.
    pub fn summary(&self) -> String {
        format!(
            "PipelineBuilder Summary:\n\
             - Gap threshold: {} s\n\
             - Window: {} s at {} Hz ({} samples)\n\
             - Min coverage: {:.0}%\n\
             - Parallel periods: {}\n\
             - Label rules: {}",
            self.segmentation.gap_threshold_secs,
            self.window.duration_secs,
            self.window.target_freq_hz,
            self.target_samples(),
            self.window.min_coverage_fraction * 100.0,
            self.window.parallel_periods,
            self.labeling.rules.len(),
        )
    }
}
