//! Labeling-stage artifacts.
//!
//! ```text
//! labeled_accelerometer_windows.npy  f64 (n_labeled, target_samples, 3)
//! labels.npy                         i64 (n_labeled), category indices
//! labeled_timestamps.npy             i64 (n_labeled), ns since Unix epoch
//! labeled_period_ids.npy             i64 (n_labeled)
//! all_labels.npy                     i64 (n_windows), -1 = unlabeled
//! labeled_mask.npy                   bool (n_windows)
//! class_mapping.json                 {"0": "light", ...}
//! labeled_dataset_summary.txt        counts, breakdowns, quality findings
//! ```
//!
//! An empty labeled subset is still exported: the labeled arrays then have
//! zero rows while `all_labels.npy` and `labeled_mask.npy` describe every
//! window.

use super::{period_ids_array, timestamps_array, write_array};
use crate::dataset::LabeledDataset;
use crate::error::Result;
use crate::labeling::{LabelReport, WindowLabel};
use crate::validation::QualityReport;
use ndarray::Array1;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const LABELED_WINDOWS_FILE: &str = "labeled_accelerometer_windows.npy";
pub const LABELS_FILE: &str = "labels.npy";
pub const LABELED_TIMESTAMPS_FILE: &str = "labeled_timestamps.npy";
pub const LABELED_PERIOD_IDS_FILE: &str = "labeled_period_ids.npy";
pub const ALL_LABELS_FILE: &str = "all_labels.npy";
pub const LABELED_MASK_FILE: &str = "labeled_mask.npy";
pub const CLASS_MAPPING_FILE: &str = "class_mapping.json";
pub const LABELED_SUMMARY_FILE: &str = "labeled_dataset_summary.txt";

/// Writes labeling-stage artifacts.
#[derive(Debug, Clone)]
pub struct LabeledDatasetExporter {
    output_dir: PathBuf,
}

impl LabeledDatasetExporter {
    /// Create an exporter writing into `output_dir` (created on export).
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Directory artifacts are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write arrays, class mapping and the text summary.
    pub fn export(
        &self,
        dataset: &LabeledDataset,
        report: &LabelReport,
        quality: Option<&QualityReport>,
    ) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        let dir = &self.output_dir;

        write_array(&dir.join(LABELED_WINDOWS_FILE), &dataset.to_array())?;

        let labels: Array1<i64> = dataset.labels().iter().map(|&l| l as i64).collect();
        write_array(&dir.join(LABELS_FILE), &labels)?;
        write_array(
            &dir.join(LABELED_TIMESTAMPS_FILE),
            &timestamps_array(&dataset.timestamps()),
        )?;
        write_array(
            &dir.join(LABELED_PERIOD_IDS_FILE),
            &period_ids_array(&dataset.period_ids()),
        )?;

        let all_labels: Array1<i64> = dataset.all_labels().iter().map(WindowLabel::to_code).collect();
        write_array(&dir.join(ALL_LABELS_FILE), &all_labels)?;
        write_array(&dir.join(LABELED_MASK_FILE), &Array1::from(dataset.labeled_mask()))?;

        let file = File::create(dir.join(CLASS_MAPPING_FILE))?;
        serde_json::to_writer_pretty(file, &dataset.class_mapping().to_index_map())?;

        self.write_summary(dataset, report, quality)?;

        log::info!(
            "Exported {} labeled windows (of {}) to {}",
            dataset.len(),
            dataset.total_windows(),
            dir.display()
        );
        Ok(())
    }

    fn write_summary(
        &self,
        dataset: &LabeledDataset,
        report: &LabelReport,
        quality: Option<&QualityReport>,
    ) -> Result<()> {
        let path = self.output_dir.join(LABELED_SUMMARY_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);

        writeln!(writer, "Labeled Accelerometer Dataset Summary")?;
        writeln!(writer, "=====================================")?;
        writeln!(writer, "Total windows: {}", dataset.total_windows())?;
        writeln!(writer, "Labeled windows: {}", dataset.len())?;
        writeln!(
            writer,
            "Labeled windows shape: ({}, {}, 3)",
            dataset.len(),
            dataset.target_samples()
        )?;

        writeln!(writer)?;
        writeln!(writer, "Class mapping:")?;
        for (idx, name) in dataset.class_mapping().names().iter().enumerate() {
            writeln!(writer, "  {idx}: {name}")?;
        }

        writeln!(writer)?;
        write!(writer, "{}", report.render(dataset.class_mapping()))?;

        if let Some(quality) = quality {
            writeln!(writer)?;
            writeln!(writer, "Quality checks:")?;
            write!(writer, "{}", quality.render())?;
        }

        writer.flush()?;
        Ok(())
    }
}
