//! Motion Dataset
//!
//! Turns an irregularly sampled stream of triaxial accelerometer readings
//! into fixed-shape, fixed-rate, labeled windows for supervised training.
//!
//! # Overview
//!
//! The pipeline runs in three stages:
//!
//! - **Segmentation**: split the stream into continuous periods wherever the
//!   gap between consecutive samples exceeds a threshold
//! - **Windowing**: tile each period with non-overlapping fixed-duration
//!   windows and resample them onto a uniform grid
//! - **Labeling**: attach a category to each window from declarative
//!   date/time-range rules, then run advisory quality checks
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Motion Dataset                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  loader/        - Sample sources (in-memory, CSV)               │
//! │  segmentation/  - Gap-based continuous period detection         │
//! │  windowing/     - Fixed grid, coverage admission, resampling    │
//! │  labeling/      - Time-range rules, label reports               │
//! │  validation/    - NaN/Inf, axis ranges, class balance           │
//! │  export/        - NumPy export and reload for Python/PyTorch    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use motion_dataset::prelude::*;
//!
//! let pipeline = PipelineBuilder::new()
//!     .gap_threshold(5.0)
//!     .window(10.0, 30.0)
//!     .rule("2025-08-04", "17:30:00", "18:15:00", "sleep")
//!     .build()?;
//!
//! let output = pipeline.run(&CsvSampleSource::new("accelerometer.csv"))?;
//! pipeline.export(&output, "dataset/")?;
//! ```

pub mod builder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod labeling;
pub mod loader;
pub mod pipeline;
pub mod prelude;
pub mod segmentation;
pub mod validation;
pub mod windowing;

// Re-exports - Config
pub use builder::PipelineBuilder;
pub use config::{
    ExperimentMetadata, LabelingConfig, PipelineConfig, SegmentationConfig, WindowConfig,
};

// Re-exports - Errors
pub use error::{DatasetError, Result};

// Re-exports - Loading and Segmentation
pub use loader::{load_samples, CsvSampleSource, Sample, SampleSource, SqliteSampleSource};
pub use segmentation::{detect_continuous_periods, ContinuousPeriod, SegmentDetector};

// Re-exports - Windowing
pub use dataset::{LabeledDataset, WindowDataset};
pub use windowing::{resample_window, Resampler, Window, Windower, WindowingStats};

// Re-exports - Labeling
pub use labeling::{
    assign_labels, ClassMapping, LabelReport, LabelRule, LabelRuleSet, Labeler, WindowLabel,
};

// Re-exports - Validation
pub use validation::{
    BalanceSeverity, QualityChecker, QualityConfig, QualityReport, ValidationLevel,
    ValidationResult,
};

// Re-exports - Export
pub use export::{LabeledDatasetExporter, WindowDatasetExporter};

// Re-exports - Pipeline
pub use pipeline::{Pipeline, PipelineOutput, WindowingOutput};
