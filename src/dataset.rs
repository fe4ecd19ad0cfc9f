//! Stage hand-off types.
//!
//! [`WindowDataset`] is what the windowing stage produces and the labeling
//! stage consumes; [`LabeledDataset`] is the labeling stage's output. Both
//! own their windows, so each stage's result is independent of its input.

use crate::error::{DatasetError, Result};
use crate::labeling::{ClassMapping, WindowLabel};
use crate::windowing::Window;
use chrono::NaiveDateTime;
use ndarray::Array3;
use std::collections::BTreeMap;

/// Stack windows into a `(n_windows, target_samples, 3)` array.
fn windows_to_array(windows: &[Window], target_samples: usize) -> Array3<f64> {
    Array3::from_shape_fn((windows.len(), target_samples, 3), |(i, j, k)| {
        windows[i].samples[j][k]
    })
}

/// Unfiltered windows with their start timestamps and period ids.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDataset {
    windows: Vec<Window>,
    target_samples: usize,
}

impl WindowDataset {
    /// Wrap windows that all hold `target_samples` rows.
    ///
    /// # Errors
    ///
    /// `DatasetError::Data` if any window has a different row count.
    pub fn new(windows: Vec<Window>, target_samples: usize) -> Result<Self> {
        if let Some((i, bad)) = windows
            .iter()
            .enumerate()
            .find(|(_, w)| w.len() != target_samples)
        {
            return Err(DatasetError::data(format!(
                "window {i} has {} rows, expected {target_samples}",
                bad.len()
            )));
        }
        Ok(Self {
            windows,
            target_samples,
        })
    }

    /// Rebuild from the persisted array form.
    ///
    /// # Errors
    ///
    /// `DatasetError::Data` if the last axis is not 3 or the three inputs
    /// disagree on the window count.
    pub fn from_arrays(
        windows: &Array3<f64>,
        timestamps: Vec<NaiveDateTime>,
        period_ids: Vec<usize>,
    ) -> Result<Self> {
        let (n_windows, target_samples, axes) = windows.dim();
        if axes != 3 {
            return Err(DatasetError::data(format!(
                "windows array must have 3 axes in its last dimension, got {axes}"
            )));
        }
        if timestamps.len() != n_windows || period_ids.len() != n_windows {
            return Err(DatasetError::data(format!(
                "artifact length mismatch: {} windows, {} timestamps, {} period ids",
                n_windows,
                timestamps.len(),
                period_ids.len()
            )));
        }

        let windows = windows
            .outer_iter()
            .zip(timestamps)
            .zip(period_ids)
            .map(|((rows, start), period_id)| Window {
                start,
                samples: rows
                    .outer_iter()
                    .map(|row| [row[0], row[1], row[2]])
                    .collect(),
                period_id,
            })
            .collect();

        Ok(Self {
            windows,
            target_samples,
        })
    }

    /// All windows in emission order.
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether there are no windows.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Rows per window.
    pub fn target_samples(&self) -> usize {
        self.target_samples
    }

    /// Window start timestamps, aligned with [`Self::windows`].
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.windows.iter().map(|w| w.start).collect()
    }

    /// Source period ids, aligned with [`Self::windows`].
    pub fn period_ids(&self) -> Vec<usize> {
        self.windows.iter().map(|w| w.period_id).collect()
    }

    /// Window count per period id.
    pub fn windows_per_period(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for window in &self.windows {
            *counts.entry(window.period_id).or_insert(0) += 1;
        }
        counts
    }

    /// `(n_windows, target_samples, 3)` array of window payloads.
    pub fn to_array(&self) -> Array3<f64> {
        windows_to_array(&self.windows, self.target_samples)
    }
}

/// Labeled subset of a [`WindowDataset`] plus the full label column.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset {
    windows: Vec<Window>,
    labels: Vec<usize>,
    all_labels: Vec<WindowLabel>,
    class_mapping: ClassMapping,
    target_samples: usize,
}

impl LabeledDataset {
    /// Keep the windows whose label is a category.
    ///
    /// # Errors
    ///
    /// `DatasetError::Data` if `all_labels` is not aligned with `dataset`.
    pub fn from_labels(
        dataset: &WindowDataset,
        all_labels: Vec<WindowLabel>,
        class_mapping: ClassMapping,
    ) -> Result<Self> {
        if all_labels.len() != dataset.len() {
            return Err(DatasetError::data(format!(
                "label column has {} entries for {} windows",
                all_labels.len(),
                dataset.len()
            )));
        }

        let (windows, labels): (Vec<Window>, Vec<usize>) = dataset
            .windows()
            .iter()
            .zip(&all_labels)
            .filter_map(|(window, label)| label.category().map(|idx| (window.clone(), idx)))
            .unzip();

        Ok(Self {
            windows,
            labels,
            all_labels,
            class_mapping,
            target_samples: dataset.target_samples(),
        })
    }

    /// Labeled windows in original order.
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Category index per labeled window.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Label of every window of the unfiltered dataset.
    pub fn all_labels(&self) -> &[WindowLabel] {
        &self.all_labels
    }

    /// Category index ↔ name mapping.
    pub fn class_mapping(&self) -> &ClassMapping {
        &self.class_mapping
    }

    /// Number of labeled windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no window was labeled.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Number of windows in the unfiltered dataset.
    pub fn total_windows(&self) -> usize {
        self.all_labels.len()
    }

    /// Rows per window.
    pub fn target_samples(&self) -> usize {
        self.target_samples
    }

    /// Start timestamps of labeled windows.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.windows.iter().map(|w| w.start).collect()
    }

    /// Period ids of labeled windows.
    pub fn period_ids(&self) -> Vec<usize> {
        self.windows.iter().map(|w| w.period_id).collect()
    }

    /// `true` for every unfiltered window that carries a category.
    pub fn labeled_mask(&self) -> Vec<bool> {
        self.all_labels.iter().map(WindowLabel::is_labeled).collect()
    }

    /// `(n_labeled, target_samples, 3)` array of labeled window payloads.
    pub fn to_array(&self) -> Array3<f64> {
        windows_to_array(&self.windows, self.target_samples)
    }
}
