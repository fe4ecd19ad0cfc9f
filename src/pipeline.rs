//! Dataset Pipeline
//!
//! Connects the stages into one batch run:
//!
//! ```text
//! SampleSource → load_samples → SegmentDetector → Windower (+ Resampler)
//!                                                       ↓
//!                                                 WindowDataset ──(export / load)──┐
//!                                                       ↓                          │
//!                                                    Labeler  ←────────────────────┘
//!                                                       ↓
//!                                                QualityChecker
//!                                                       ↓
//!                                        LabeledDataset + LabelReport + QualityReport
//! ```
//!
//! Every stage takes its input by reference and returns a new owned value, so
//! the windowing output can be labeled several times with different rule
//! sets, or persisted and labeled later from another process.
//!
//! # Example
//!
//! ```ignore
//! use motion_dataset::prelude::*;
//!
//! let pipeline = PipelineBuilder::new()
//!     .window(10.0, 30.0)
//!     .rule("2025-08-04", "17:30:00", "18:15:00", "sleep")
//!     .build()?;
//!
//! let output = pipeline.run(&CsvSampleSource::new("accelerometer.csv"))?;
//! pipeline.export(&output, "dataset/")?;
//! ```
//!
//! # Fatal Conditions
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Missing or empty input | `DatasetError::Data` |
//! | No window survives | `DatasetError::NoWindows` |
//! | Resuming without windowing artifacts | `DatasetError::MissingArtifact` |
//!
//! All of them are raised before the stage that hit them writes anything.

use crate::config::PipelineConfig;
use crate::dataset::WindowDataset;
use crate::error::Result;
use crate::export::{LabeledDatasetExporter, WindowDatasetExporter};
use crate::labeling::{Labeler, LabelingOutput};
use crate::loader::{load_samples, Sample, SampleSource};
use crate::segmentation::{ContinuousPeriod, SegmentDetector};
use crate::validation::{QualityChecker, QualityReport};
use crate::windowing::{Windower, WindowingStats};
use std::path::Path;

/// Output of the windowing stage.
#[derive(Debug, Clone)]
pub struct WindowingOutput {
    /// Samples read from the source
    pub samples_loaded: usize,

    /// Detected continuous periods
    pub periods: Vec<ContinuousPeriod>,

    /// Emitted windows
    pub dataset: WindowDataset,

    /// Per-period windowing diagnostics
    pub stats: WindowingStats,
}

/// Output of a full run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Loaded samples, periods and windows
    pub windowing: WindowingOutput,

    /// Labeled subset and label report
    pub labeling: LabelingOutput,

    /// Advisory findings over the labeled subset
    pub quality: QualityReport,
}

/// Main pipeline, immutable once built.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    detector: SegmentDetector,
    windower: Windower,
    labeler: Labeler,
    quality: QualityChecker,
}

impl Pipeline {
    /// Create a pipeline from configuration.
    ///
    /// # Errors
    ///
    /// `DatasetError::Config` if the configuration or any label rule is
    /// invalid.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let detector = SegmentDetector::new(config.segmentation.clone());
        let windower = Windower::new(config.window.clone());
        let labeler = Labeler::new(config.labeling.compile()?);
        let quality = QualityChecker::with_config(config.quality.clone());

        Ok(Self {
            config,
            detector,
            windower,
            labeler,
            quality,
        })
    }

    /// Replace the quality checker built from the `[quality]` section.
    pub fn with_quality_checker(mut self, checker: QualityChecker) -> Self {
        self.quality = checker;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load, segment and window.
    ///
    /// # Errors
    ///
    /// `DatasetError::Data` for missing or empty input,
    /// `DatasetError::NoWindows` when nothing survives windowing.
    pub fn build_windows<S: SampleSource + ?Sized>(&self, source: &S) -> Result<WindowingOutput> {
        let samples = load_samples(source)?;
        self.window_samples(&samples)
    }

    fn window_samples(&self, samples: &[Sample]) -> Result<WindowingOutput> {
        let periods = self.detector.detect(samples);
        let (dataset, stats) = self.windower.window_periods(samples, &periods)?;

        Ok(WindowingOutput {
            samples_loaded: samples.len(),
            periods,
            dataset,
            stats,
        })
    }

    /// Label a window dataset. An all-unlabeled result is not an error.
    pub fn label(&self, dataset: &WindowDataset) -> Result<LabelingOutput> {
        self.labeler.label(dataset)
    }

    /// Run the advisory quality checks on a labeling result.
    pub fn check_quality(&self, labeling: &LabelingOutput) -> QualityReport {
        self.quality.check(&labeling.dataset)
    }

    /// Full run from raw samples to labeled dataset.
    pub fn run<S: SampleSource + ?Sized>(&self, source: &S) -> Result<PipelineOutput> {
        let windowing = self.build_windows(source)?;
        let labeling = self.label(&windowing.dataset)?;
        let quality = self.check_quality(&labeling);

        Ok(PipelineOutput {
            windowing,
            labeling,
            quality,
        })
    }

    /// Resume at labeling from windowing artifacts in `dir`.
    ///
    /// # Errors
    ///
    /// `DatasetError::MissingArtifact` if a windowing artifact is absent.
    pub fn label_from_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(LabelingOutput, QualityReport)> {
        let dataset = WindowDatasetExporter::load(dir)?;
        if dataset.target_samples() != self.windower.target_samples() {
            log::warn!(
                "Loaded windows have {} samples each, configuration expects {}",
                dataset.target_samples(),
                self.windower.target_samples()
            );
        }
        let labeling = self.label(&dataset)?;
        let quality = self.check_quality(&labeling);
        Ok((labeling, quality))
    }

    /// Write windowing artifacts.
    pub fn export_windows<P: AsRef<Path>>(&self, windowing: &WindowingOutput, dir: P) -> Result<()> {
        WindowDatasetExporter::new(dir, self.config.window.clone())
            .with_metadata(self.config.metadata.clone())
            .export(&windowing.dataset, Some(&windowing.stats))
    }

    /// Write labeling artifacts.
    pub fn export_labeled<P: AsRef<Path>>(
        &self,
        labeling: &LabelingOutput,
        quality: &QualityReport,
        dir: P,
    ) -> Result<()> {
        LabeledDatasetExporter::new(dir).export(&labeling.dataset, &labeling.report, Some(quality))
    }

    /// Write both stages' artifacts into `dir`.
    pub fn export<P: AsRef<Path>>(&self, output: &PipelineOutput, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        self.export_windows(&output.windowing, dir)?;
        self.export_labeled(&output.labeling, &output.quality, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelingConfig;
    use crate::validation::QualityConfig;
    use crate::error::DatasetError;
    use crate::labeling::LabelRule;
    use crate::loader::parse_timestamp;
    use chrono::Duration;

    fn samples_at_30hz(start: &str, n: usize) -> Vec<Sample> {
        let t0 = parse_timestamp(start).unwrap();
        (0..n)
            .map(|i| {
                let ts = t0 + Duration::nanoseconds((i as i64 * 1_000_000_000) / 30);
                Sample::new(ts, 0.1, 0.2, 9.8)
            })
            .collect()
    }

    #[test]
    fn test_run_labels_sleep() {
        let config = PipelineConfig::default().with_labeling(LabelingConfig::new(vec![
            LabelRule::new("2025-08-04", "17:30:00", "18:15:00", "sleep"),
        ]));
        let pipeline = Pipeline::from_config(config).unwrap();

        let samples = samples_at_30hz("2025-08-04 17:45:00", 360);
        let output = pipeline.run(&samples).unwrap();

        assert_eq!(output.windowing.periods.len(), 1);
        assert_eq!(output.windowing.dataset.len(), 1);
        assert_eq!(output.labeling.dataset.labels(), &[0]);
    }

    #[test]
    fn test_no_windows_is_fatal() {
        let pipeline = Pipeline::from_config(PipelineConfig::default()).unwrap();
        let samples = samples_at_30hz("2025-08-04 17:45:00", 60);
        let err = pipeline.run(&samples).unwrap_err();
        assert!(matches!(err, DatasetError::NoWindows { .. }));
    }

    #[test]
    fn test_invalid_rule_rejected_at_build() {
        let config = PipelineConfig::default().with_labeling(LabelingConfig::new(vec![
            LabelRule::new("2025-08-04", "18:00:00", "17:00:00", "sleep"),
        ]));
        assert!(matches!(
            Pipeline::from_config(config).unwrap_err(),
            DatasetError::Config(_)
        ));
    }

    #[test]
    fn test_quality_thresholds_from_config() {
        let rules = LabelingConfig::new(vec![LabelRule::new(
            "2025-08-04",
            "17:30:00",
            "18:15:00",
            "sleep",
        )]);
        let samples = samples_at_30hz("2025-08-04 17:45:00", 360);

        // One labeled window is "very small" under the defaults
        let pipeline = Pipeline::from_config(PipelineConfig::default().with_labeling(rules.clone())).unwrap();
        assert!(pipeline.run(&samples).unwrap().quality.result.has_warnings());

        let relaxed = QualityConfig {
            very_small_dataset: 1,
            small_dataset: 1,
            ..QualityConfig::default()
        };
        let config = PipelineConfig::default()
            .with_labeling(rules.clone())
            .with_quality(relaxed.clone());
        let pipeline = Pipeline::from_config(config).unwrap();
        assert!(pipeline.run(&samples).unwrap().quality.result.is_valid());

        // An explicit checker replaces the configured one
        let strict = QualityConfig {
            very_small_dataset: 10,
            ..relaxed
        };
        let pipeline = Pipeline::from_config(PipelineConfig::default().with_labeling(rules))
            .unwrap()
            .with_quality_checker(QualityChecker::with_config(strict));
        let output = pipeline.run(&samples).unwrap();
        assert!(output.quality.result.warnings()[0].contains("very small dataset"));
    }
}
