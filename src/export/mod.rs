//! Data Export Module
//!
//! Persist stage outputs as NumPy arrays plus JSON/text sidecars so training
//! code in Python can load them directly, and reload the windowing stage to
//! resume at labeling.
//!
//! # Layout
//!
//! Windowing stage ([`WindowDatasetExporter`]):
//!
//! ```text
//! accelerometer_windows.npy   f64 (n_windows, target_samples, 3)
//! window_timestamps.npy       i64 (n_windows), ns since Unix epoch
//! window_period_ids.npy       i64 (n_windows)
//! window_timestamps.txt       "Window {i}: {ts} (Period {id})"
//! dataset_info.txt            human-readable summary
//! windowing_metadata.json     machine-readable summary
//! ```
//!
//! Labeling stage ([`LabeledDatasetExporter`]): see [`labeled`].
//!
//! # Example
//!
//! ```ignore
//! use motion_dataset::export::WindowDatasetExporter;
//!
//! let exporter = WindowDatasetExporter::new(output_dir, config.window.clone());
//! exporter.export(&dataset, Some(&stats))?;
//!
//! // Later, possibly in another process
//! let dataset = WindowDatasetExporter::load(output_dir)?;
//! ```

pub mod labeled;

pub use labeled::LabeledDatasetExporter;

use crate::config::{ExperimentMetadata, WindowConfig};
use crate::dataset::WindowDataset;
use crate::error::{DatasetError, Result};
use crate::loader::{from_epoch_nanos, to_epoch_nanos};
use crate::windowing::WindowingStats;
use chrono::NaiveDateTime;
use ndarray::{Array1, Array3};
use ndarray_npy::{ReadNpyExt, WritableElement, WriteNpyExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const WINDOWS_FILE: &str = "accelerometer_windows.npy";
pub const WINDOW_TIMESTAMPS_FILE: &str = "window_timestamps.npy";
pub const WINDOW_PERIOD_IDS_FILE: &str = "window_period_ids.npy";
pub const WINDOW_TIMESTAMPS_TEXT_FILE: &str = "window_timestamps.txt";
pub const DATASET_INFO_FILE: &str = "dataset_info.txt";
pub const WINDOWING_METADATA_FILE: &str = "windowing_metadata.json";

/// Write any ndarray the npy format supports.
pub(crate) fn write_array<A, D>(path: &Path, array: &ndarray::Array<A, D>) -> Result<()>
where
    A: WritableElement,
    D: ndarray::Dimension,
{
    let writer = BufWriter::new(File::create(path)?);
    array.write_npy(writer)?;
    log::debug!("Wrote {} {:?}", path.display(), array.shape());
    Ok(())
}

/// Timestamps as an `i64` nanosecond column.
pub(crate) fn timestamps_array(timestamps: &[NaiveDateTime]) -> Array1<i64> {
    timestamps.iter().map(to_epoch_nanos).collect()
}

/// Period ids as an `i64` column.
pub(crate) fn period_ids_array(period_ids: &[usize]) -> Array1<i64> {
    period_ids.iter().map(|&id| id as i64).collect()
}

/// Machine-readable description of an exported window dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowingMetadata {
    /// Number of windows
    pub n_windows: usize,

    /// Rows per window
    pub target_samples: usize,

    /// Axes per row (always 3)
    pub n_axes: usize,

    /// Window configuration used
    pub window: WindowConfig,

    /// Windows per period id
    pub windows_per_period: BTreeMap<usize, usize>,

    /// First window start
    pub first_window: Option<String>,

    /// Last window start
    pub last_window: Option<String>,

    /// Continuous periods examined (when stats are available)
    pub periods_total: Option<usize>,

    /// Periods skipped as too short
    pub periods_skipped: Option<usize>,

    /// Candidate windows considered
    pub candidates: Option<usize>,

    /// Candidates dropped for low coverage
    pub dropped_low_coverage: Option<usize>,

    /// Experiment description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment: Option<ExperimentMetadata>,

    /// Export timestamp
    pub export_timestamp: String,
}

/// Writes and reloads windowing-stage artifacts.
#[derive(Debug, Clone)]
pub struct WindowDatasetExporter {
    output_dir: PathBuf,
    config: WindowConfig,
    metadata: Option<ExperimentMetadata>,
}

impl WindowDatasetExporter {
    /// Create an exporter writing into `output_dir`.
    pub fn new<P: AsRef<Path>>(output_dir: P, config: WindowConfig) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            config,
            metadata: None,
        }
    }

    /// Attach experiment metadata to `windowing_metadata.json`.
    pub fn with_metadata(mut self, metadata: Option<ExperimentMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write all windowing artifacts.
    ///
    /// # Errors
    ///
    /// `DatasetError::Data` for an empty dataset, checked before anything is
    /// written; otherwise IO / npy / JSON failures.
    pub fn export(&self, dataset: &WindowDataset, stats: Option<&WindowingStats>) -> Result<()> {
        if dataset.is_empty() {
            return Err(DatasetError::data("no windows to export"));
        }

        fs::create_dir_all(&self.output_dir)?;

        let timestamps = dataset.timestamps();
        let period_ids = dataset.period_ids();

        write_array(&self.output_dir.join(WINDOWS_FILE), &dataset.to_array())?;
        write_array(
            &self.output_dir.join(WINDOW_TIMESTAMPS_FILE),
            &timestamps_array(&timestamps),
        )?;
        write_array(
            &self.output_dir.join(WINDOW_PERIOD_IDS_FILE),
            &period_ids_array(&period_ids),
        )?;

        self.write_timestamps_text(&timestamps, &period_ids)?;
        self.write_info(dataset)?;
        self.write_metadata(dataset, stats)?;

        log::info!(
            "Exported {} windows of {} × 3 to {}",
            dataset.len(),
            dataset.target_samples(),
            self.output_dir.display()
        );

        Ok(())
    }

    fn write_timestamps_text(&self, timestamps: &[NaiveDateTime], period_ids: &[usize]) -> Result<()> {
        let path = self.output_dir.join(WINDOW_TIMESTAMPS_TEXT_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        for (i, (ts, period_id)) in timestamps.iter().zip(period_ids).enumerate() {
            writeln!(writer, "Window {i}: {ts} (Period {period_id})")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_info(&self, dataset: &WindowDataset) -> Result<()> {
        let path = self.output_dir.join(DATASET_INFO_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);

        writeln!(writer, "Accelerometer Window Dataset")?;
        writeln!(writer, "============================")?;
        writeln!(
            writer,
            "Windows shape: ({}, {}, 3)",
            dataset.len(),
            dataset.target_samples()
        )?;
        writeln!(writer, "Window duration: {} seconds", self.config.duration_secs)?;
        writeln!(writer, "Target frequency: {} Hz", self.config.target_freq_hz)?;
        writeln!(writer, "Samples per window: {}", dataset.target_samples())?;
        writeln!(
            writer,
            "Minimum coverage: {:.0}%",
            self.config.min_coverage_fraction * 100.0
        )?;
        writeln!(writer, "Total windows: {}", dataset.len())?;

        let windows = dataset.windows();
        if let (Some(first), Some(last)) = (windows.first(), windows.last()) {
            writeln!(writer, "Time range: {} to {}", first.start, last.start)?;
        }

        writeln!(writer)?;
        writeln!(writer, "Windows per period:")?;
        for (period_id, count) in dataset.windows_per_period() {
            writeln!(writer, "  Period {period_id}: {count} windows")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_metadata(&self, dataset: &WindowDataset, stats: Option<&WindowingStats>) -> Result<()> {
        let windows = dataset.windows();
        let metadata = WindowingMetadata {
            n_windows: dataset.len(),
            target_samples: dataset.target_samples(),
            n_axes: 3,
            window: self.config.clone(),
            windows_per_period: dataset.windows_per_period(),
            first_window: windows.first().map(|w| w.start.to_string()),
            last_window: windows.last().map(|w| w.start.to_string()),
            periods_total: stats.map(WindowingStats::periods_total),
            periods_skipped: stats.map(WindowingStats::periods_skipped),
            candidates: stats.map(WindowingStats::candidates),
            dropped_low_coverage: stats.map(WindowingStats::dropped_low_coverage),
            experiment: self.metadata.clone(),
            export_timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let file = File::create(self.output_dir.join(WINDOWING_METADATA_FILE))?;
        serde_json::to_writer_pretty(file, &metadata)?;
        Ok(())
    }

    /// Reload a window dataset written by [`Self::export`].
    ///
    /// # Errors
    ///
    /// `DatasetError::MissingArtifact` if any of the three array files is
    /// absent; `DatasetError::Data` if their lengths disagree.
    pub fn load<P: AsRef<Path>>(input_dir: P) -> Result<WindowDataset> {
        let dir = input_dir.as_ref();
        let windows_path = require(dir, WINDOWS_FILE)?;
        let timestamps_path = require(dir, WINDOW_TIMESTAMPS_FILE)?;
        let period_ids_path = require(dir, WINDOW_PERIOD_IDS_FILE)?;

        let windows = Array3::<f64>::read_npy(File::open(&windows_path)?)?;
        let timestamps = Array1::<i64>::read_npy(File::open(&timestamps_path)?)?;
        let period_ids = Array1::<i64>::read_npy(File::open(&period_ids_path)?)?;

        let timestamps: Vec<NaiveDateTime> = timestamps.iter().map(|&n| from_epoch_nanos(n)).collect();
        let period_ids = period_ids
            .iter()
            .map(|&id| {
                usize::try_from(id).map_err(|_| {
                    DatasetError::data(format!(
                        "negative period id {id} in {}",
                        period_ids_path.display()
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let dataset = WindowDataset::from_arrays(&windows, timestamps, period_ids)?;
        log::info!(
            "Loaded {} windows ({} samples each) from {}",
            dataset.len(),
            dataset.target_samples(),
            dir.display()
        );
        Ok(dataset)
    }
}

fn require(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(DatasetError::MissingArtifact(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windowing::Window;
    use tempfile::TempDir;

    fn dataset() -> WindowDataset {
        let windows = (0..3)
            .map(|i| Window {
                start: from_epoch_nanos(1_754_328_600_000_000_000 + i * 10_000_000_000),
                samples: vec![[i as f64, 0.5, -9.81]; 4],
                period_id: (i / 2) as usize,
            })
            .collect();
        WindowDataset::new(windows, 4).unwrap()
    }

    #[test]
    fn test_export_writes_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = WindowDatasetExporter::new(temp_dir.path(), WindowConfig::default());
        exporter.export(&dataset(), None).unwrap();

        for name in [
            WINDOWS_FILE,
            WINDOW_TIMESTAMPS_FILE,
            WINDOW_PERIOD_IDS_FILE,
            WINDOW_TIMESTAMPS_TEXT_FILE,
            DATASET_INFO_FILE,
            WINDOWING_METADATA_FILE,
        ] {
            assert!(temp_dir.path().join(name).exists(), "missing {name}");
        }

        let text = fs::read_to_string(temp_dir.path().join(WINDOW_TIMESTAMPS_TEXT_FILE)).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(2).unwrap().ends_with("(Period 1)"));
    }

    #[test]
    fn test_export_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let original = dataset();
        WindowDatasetExporter::new(temp_dir.path(), WindowConfig::default())
            .export(&original, None)
            .unwrap();

        let loaded = WindowDatasetExporter::load(temp_dir.path()).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_empty_dataset_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let err = WindowDatasetExporter::new(&out, WindowConfig::default())
            .export(&WindowDataset::new(Vec::new(), 300).unwrap(), None)
            .unwrap_err();
        assert!(matches!(err, DatasetError::Data(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_load_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let err = WindowDatasetExporter::load(temp_dir.path()).unwrap_err();
        match err {
            DatasetError::MissingArtifact(path) => assert!(path.ends_with(WINDOWS_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
