//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use motion_dataset::prelude::*;
//!
//! let pipeline = Pipeline::from_config(PipelineConfig::load_toml("dataset.toml")?)?;
//! let output = pipeline.run(&CsvSampleSource::new("accelerometer.csv"))?;
//! ```
//!
//! # What's Included
//!
//! ## Core Pipeline
//! - [`Pipeline`] - Stage orchestration
//! - [`PipelineBuilder`] - Fluent configuration
//! - [`PipelineConfig`] - Serializable configuration
//! - [`PipelineOutput`] - Output of a full run
//!
//! ## Stages
//! - [`SampleSource`] - Anything that yields samples
//! - [`SegmentDetector`] - Continuous period detection
//! - [`Windower`] - Fixed-grid windowing
//! - [`Labeler`] - Rule-based labeling
//! - [`QualityChecker`] - Advisory dataset checks
//!
//! ## Export
//! - [`WindowDatasetExporter`] - Windowing artifacts, and reload
//! - [`LabeledDatasetExporter`] - Labeling artifacts

// ============================================================================
// Core Pipeline
// ============================================================================

pub use crate::builder::PipelineBuilder;
pub use crate::config::{
    ExperimentMetadata, LabelingConfig, PipelineConfig, SegmentationConfig, WindowConfig,
};
pub use crate::error::{DatasetError, Result};
pub use crate::pipeline::{Pipeline, PipelineOutput, WindowingOutput};

// ============================================================================
// Stages
// ============================================================================

pub use crate::dataset::{LabeledDataset, WindowDataset};
pub use crate::labeling::{
    ClassMapping, LabelReport, LabelRule, LabelRuleSet, Labeler, LabelingOutput, WindowLabel,
};
pub use crate::loader::{
    load_samples, CsvSampleSource, Sample, SampleSource, SqliteSampleSource,
};
pub use crate::segmentation::{ContinuousPeriod, SegmentDetector};
pub use crate::validation::{QualityChecker, QualityReport, ValidationResult};
pub use crate::windowing::{Window, Windower, WindowingStats};

// ============================================================================
// Export
// ============================================================================

pub use crate::export::{LabeledDatasetExporter, WindowDatasetExporter};
