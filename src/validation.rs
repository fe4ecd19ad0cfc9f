//! Dataset Quality Checks
//!
//! Advisory checks over a [`LabeledDataset`] before it is handed to training.
//! Findings never block export; they are collected in a [`ValidationResult`],
//! logged, and written into the labeled summary.
//!
//! # Check Categories
//!
//! 1. **Value Sanity**: NaN/Inf counts across all window payloads
//! 2. **Axis Ranges**: per-axis `(min, max)` for a quick unit sanity check
//! 3. **Class Balance**: smallest / largest class count ratio
//! 4. **Dataset Size**: very small and small dataset advisories
//!
//! # Usage
//!
//! ```ignore
//! use motion_dataset::validation::QualityChecker;
//!
//! let report = QualityChecker::default().check(&labeled);
//! for warning in report.result.warnings() {
//!     log::warn!("{warning}");
//! }
//! ```

use crate::dataset::LabeledDataset;
use crate::error::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Validation result for a single check.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    /// Data is valid
    Valid,
    /// Data has minor issues (warnings)
    Warning(String),
    /// Data has serious issues (errors)
    Error(String),
}

impl ValidationLevel {
    /// Check if this result indicates valid data.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationLevel::Valid)
    }

    /// Check if this result is a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationLevel::Warning(_))
    }

    /// Check if this result is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, ValidationLevel::Error(_))
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLevel::Valid => write!(f, "Valid"),
            ValidationLevel::Warning(msg) => write!(f, "Warning: {msg}"),
            ValidationLevel::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Aggregated validation result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    results: Vec<(String, ValidationLevel)>,
}

impl ValidationResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation result.
    pub fn add(&mut self, check_name: &str, level: ValidationLevel) {
        self.results.push((check_name.to_string(), level));
    }

    /// Check if all validations passed (no errors or warnings).
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|(_, level)| level.is_valid())
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_error())
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_warning())
    }

    /// All warnings as `check: message`.
    pub fn warnings(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Warning(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    /// All errors as `check: message`.
    pub fn errors(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Error(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    /// Get the number of checks performed.
    pub fn check_count(&self) -> usize {
        self.results.len()
    }

    /// Get the number of passed checks.
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|(_, l)| l.is_valid()).count()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.passed_count();
        let total = self.check_count();
        writeln!(f, "Validation: {passed}/{total} checks passed")?;

        for (name, level) in &self.results {
            if !level.is_valid() {
                writeln!(f, "  - {name}: {level}")?;
            }
        }

        Ok(())
    }
}

/// Thresholds for the advisory checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Balance ratio below this is severe
    pub severe_imbalance_ratio: f64,

    /// Balance ratio below this is moderate
    pub moderate_imbalance_ratio: f64,

    /// Fewer labeled windows than this is "very small"
    pub very_small_dataset: usize,

    /// Fewer labeled windows than this is "small"
    pub small_dataset: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            severe_imbalance_ratio: 0.1,
            moderate_imbalance_ratio: 0.3,
            very_small_dataset: 100,
            small_dataset: 1000,
        }
    }
}

impl QualityConfig {
    /// Ratios in `(0, 1]` with severe at or below moderate, and the very
    /// small threshold at or below the small one.
    pub fn validate(&self) -> Result<()> {
        for (name, ratio) in [
            ("severe_imbalance_ratio", self.severe_imbalance_ratio),
            ("moderate_imbalance_ratio", self.moderate_imbalance_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(DatasetError::config(format!(
                    "{name} must be in (0, 1], got {ratio}"
                )));
            }
        }
        if self.severe_imbalance_ratio > self.moderate_imbalance_ratio {
            return Err(DatasetError::config(format!(
                "severe_imbalance_ratio ({}) exceeds moderate_imbalance_ratio ({})",
                self.severe_imbalance_ratio, self.moderate_imbalance_ratio
            )));
        }
        if self.very_small_dataset > self.small_dataset {
            return Err(DatasetError::config(format!(
                "very_small_dataset ({}) exceeds small_dataset ({})",
                self.very_small_dataset, self.small_dataset
            )));
        }
        Ok(())
    }
}

/// Severity of class imbalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceSeverity {
    Severe,
    Moderate,
    Acceptable,
}

impl fmt::Display for BalanceSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceSeverity::Severe => write!(f, "severe imbalance"),
            BalanceSeverity::Moderate => write!(f, "moderate imbalance"),
            BalanceSeverity::Acceptable => write!(f, "acceptable balance"),
        }
    }
}

/// Class count statistics over the labeled subset.
///
/// Only categories with at least one window take part; a category the
/// mapping names but no window carries does not drag the ratio to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBalance {
    /// Labeled windows per category index
    pub counts: BTreeMap<usize, usize>,
    /// Smallest present class
    pub min_count: usize,
    /// Largest class
    pub max_count: usize,
    /// `min_count / max_count`
    pub ratio: f64,
    pub severity: BalanceSeverity,
}

/// Min and max of one axis over all finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    /// Smallest finite value
    pub min: f64,
    /// Largest finite value
    pub max: f64,
}

/// Outcome of [`QualityChecker::check`].
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    /// Labeled windows inspected
    pub n_windows: usize,

    /// NaN values across all window rows and axes
    pub nan_count: usize,

    /// Infinite values across all window rows and axes
    pub inf_count: usize,

    /// x, y, z ranges; `None` when there are no finite values
    pub axis_ranges: [Option<AxisRange>; 3],

    /// `None` when the labeled subset is empty
    pub class_balance: Option<ClassBalance>,

    /// Every finding, valid or not
    pub result: ValidationResult,
}

impl QualityReport {
    /// Multi-line summary for the labeled dataset summary file.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Labeled windows checked: {}\n", self.n_windows));
        out.push_str(&format!("NaN values: {}\n", self.nan_count));
        out.push_str(&format!("Inf values: {}\n", self.inf_count));
        for (axis, range) in ["x", "y", "z"].iter().zip(&self.axis_ranges) {
            match range {
                Some(r) => out.push_str(&format!("{axis} range: [{:.3}, {:.3}]\n", r.min, r.max)),
                None => out.push_str(&format!("{axis} range: n/a\n")),
            }
        }
        if let Some(balance) = &self.class_balance {
            out.push_str(&format!(
                "Class balance ratio (min/max): {:.3} ({})\n",
                balance.ratio, balance.severity
            ));
        }
        out.push_str(&self.result.to_string());
        out
    }
}

/// Runs advisory checks over a labeled dataset.
#[derive(Debug, Clone, Default)]
pub struct QualityChecker {
    config: QualityConfig,
}

impl QualityChecker {
    /// Create a checker with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a checker with custom thresholds.
    pub fn with_config(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Inspect `dataset`. Never fails; problems land in the report.
    pub fn check(&self, dataset: &LabeledDataset) -> QualityReport {
        let mut result = ValidationResult::new();
        let n_windows = dataset.len();

        if dataset.is_empty() {
            result.add(
                "labeled_windows",
                ValidationLevel::Warning("No labeled windows to check".to_string()),
            );
            log::warn!("Quality check: no labeled windows");
            return QualityReport {
                n_windows,
                nan_count: 0,
                inf_count: 0,
                axis_ranges: [None; 3],
                class_balance: None,
                result,
            };
        }

        let (nan_count, inf_count, axis_ranges) = scan_values(dataset);
        self.validate_values(nan_count, inf_count, &mut result);

        let class_balance = self.class_balance(dataset.labels());
        if let Some(balance) = &class_balance {
            self.validate_balance(balance, &mut result);
        }

        self.validate_size(n_windows, &mut result);

        for finding in result.errors().iter().chain(result.warnings().iter()) {
            log::warn!("Quality check: {finding}");
        }
        log::info!(
            "Quality check: {}/{} checks passed",
            result.passed_count(),
            result.check_count()
        );

        QualityReport {
            n_windows,
            nan_count,
            inf_count,
            axis_ranges,
            class_balance,
            result,
        }
    }

    fn validate_values(&self, nan_count: usize, inf_count: usize, result: &mut ValidationResult) {
        if nan_count > 0 {
            result.add(
                "nan_values",
                ValidationLevel::Error(format!("{nan_count} NaN values in windows")),
            );
        } else {
            result.add("nan_values", ValidationLevel::Valid);
        }

        if inf_count > 0 {
            result.add(
                "inf_values",
                ValidationLevel::Error(format!("{inf_count} infinite values in windows")),
            );
        } else {
            result.add("inf_values", ValidationLevel::Valid);
        }
    }

    fn class_balance(&self, labels: &[usize]) -> Option<ClassBalance> {
        let mut counts = BTreeMap::new();
        for &label in labels {
            *counts.entry(label).or_insert(0usize) += 1;
        }

        let min_count = *counts.values().min()?;
        let max_count = *counts.values().max()?;
        let ratio = min_count as f64 / max_count as f64;
        let severity = if ratio < self.config.severe_imbalance_ratio {
            BalanceSeverity::Severe
        } else if ratio < self.config.moderate_imbalance_ratio {
            BalanceSeverity::Moderate
        } else {
            BalanceSeverity::Acceptable
        };

        Some(ClassBalance {
            counts,
            min_count,
            max_count,
            ratio,
            severity,
        })
    }

    fn validate_balance(&self, balance: &ClassBalance, result: &mut ValidationResult) {
        let level = match balance.severity {
            BalanceSeverity::Acceptable => ValidationLevel::Valid,
            severity => ValidationLevel::Warning(format!(
                "{severity}: ratio {:.3} ({} vs {} windows)",
                balance.ratio, balance.min_count, balance.max_count
            )),
        };
        result.add("class_balance", level);
    }

    fn validate_size(&self, n_windows: usize, result: &mut ValidationResult) {
        let level = if n_windows < self.config.very_small_dataset {
            ValidationLevel::Warning(format!(
                "very small dataset ({n_windows} labeled windows); consider collecting more data"
            ))
        } else if n_windows < self.config.small_dataset {
            ValidationLevel::Warning(format!(
                "small dataset ({n_windows} labeled windows); may limit model performance"
            ))
        } else {
            ValidationLevel::Valid
        };
        result.add("dataset_size", level);
    }
}

/// NaN count, Inf count and per-axis finite ranges.
fn scan_values(dataset: &LabeledDataset) -> (usize, usize, [Option<AxisRange>; 3]) {
    let mut nan_count = 0;
    let mut inf_count = 0;
    let mut ranges: [Option<AxisRange>; 3] = [None; 3];

    for window in dataset.windows() {
        for row in &window.samples {
            for (axis, &value) in row.iter().enumerate() {
                if value.is_nan() {
                    nan_count += 1;
                    continue;
                }
                if value.is_infinite() {
                    inf_count += 1;
                    continue;
                }
                ranges[axis] = Some(match ranges[axis] {
                    None => AxisRange { min: value, max: value },
                    Some(r) => AxisRange {
                        min: r.min.min(value),
                        max: r.max.max(value),
                    },
                });
            }
        }
    }

    (nan_count, inf_count, ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::WindowDataset;
    use crate::labeling::{ClassMapping, WindowLabel};
    use crate::loader::from_epoch_nanos;
    use crate::windowing::Window;

    fn labeled(payloads: Vec<[f64; 3]>, labels: Vec<WindowLabel>) -> LabeledDataset {
        let windows = labels
            .iter()
            .enumerate()
            .map(|(i, _)| Window {
                start: from_epoch_nanos(i as i64 * 10_000_000_000),
                samples: vec![payloads[i % payloads.len()]; 2],
                period_id: 0,
            })
            .collect();
        let dataset = WindowDataset::new(windows, 2).unwrap();
        LabeledDataset::from_labels(&dataset, labels, ClassMapping::new(["a", "b"])).unwrap()
    }

    #[test]
    fn test_empty_subset_single_warning() {
        let dataset = labeled(vec![[0.0; 3]], vec![WindowLabel::Unlabeled; 3]);
        let report = QualityChecker::new().check(&dataset);

        assert_eq!(report.result.check_count(), 1);
        assert!(report.result.has_warnings());
        assert_eq!(report.result.warnings().len(), 1);
        assert!(report.class_balance.is_none());
    }

    #[test]
    fn test_nan_inf_counted() {
        let dataset = labeled(
            vec![[f64::NAN, 1.0, f64::INFINITY], [0.5, -2.0, 3.0]],
            vec![WindowLabel::Category(0), WindowLabel::Category(1)],
        );
        let report = QualityChecker::new().check(&dataset);

        assert_eq!(report.nan_count, 2);
        assert_eq!(report.inf_count, 2);
        assert!(report.result.has_errors());
        assert_eq!(report.axis_ranges[0], Some(AxisRange { min: 0.5, max: 0.5 }));
        assert_eq!(report.axis_ranges[1], Some(AxisRange { min: -2.0, max: 1.0 }));
    }

    #[test]
    fn test_balance_severity() {
        let mut labels = vec![WindowLabel::Category(0); 20];
        labels.push(WindowLabel::Category(1));
        let report = QualityChecker::new().check(&labeled(vec![[0.0; 3]], labels));
        let balance = report.class_balance.unwrap();
        assert_eq!((balance.min_count, balance.max_count), (1, 20));
        assert_eq!(balance.severity, BalanceSeverity::Severe);

        let mut labels = vec![WindowLabel::Category(0); 7];
        labels.push(WindowLabel::Category(1));
        labels.push(WindowLabel::Category(1));
        let report = QualityChecker::new().check(&labeled(vec![[0.0; 3]], labels));
        assert_eq!(report.class_balance.unwrap().severity, BalanceSeverity::Moderate);
    }

    #[test]
    fn test_single_class_is_balanced() {
        let labels = vec![WindowLabel::Category(1); 4];
        let report = QualityChecker::new().check(&labeled(vec![[0.0; 3]], labels));
        let balance = report.class_balance.unwrap();
        assert_eq!(balance.ratio, 1.0);
        assert_eq!(balance.severity, BalanceSeverity::Acceptable);
    }

    #[test]
    fn test_size_advisory() {
        let config = QualityConfig {
            very_small_dataset: 2,
            small_dataset: 4,
            ..QualityConfig::default()
        };
        let checker = QualityChecker::with_config(config);

        let labels = vec![WindowLabel::Category(0); 3];
        let report = checker.check(&labeled(vec![[0.0; 3]], labels));
        assert!(report.result.warnings().iter().any(|w| w.contains("small dataset")));

        let labels = vec![WindowLabel::Category(0); 5];
        let report = checker.check(&labeled(vec![[0.0; 3]], labels));
        assert!(report.result.is_valid());
        assert!(!report.result.has_warnings());
    }

    #[test]
    fn test_quality_config_validation() {
        assert!(QualityConfig::default().validate().is_ok());

        let zero = QualityConfig {
            severe_imbalance_ratio: 0.0,
            ..QualityConfig::default()
        };
        assert!(zero.validate().is_err());

        let sizes = QualityConfig {
            very_small_dataset: 500,
            small_dataset: 100,
            ..QualityConfig::default()
        };
        assert!(sizes.validate().is_err());
    }

    #[test]
    fn test_validation_result_display() {
        let mut result = ValidationResult::new();
        result.add("test1", ValidationLevel::Valid);
        result.add("test2", ValidationLevel::Warning("minor issue".to_string()));
        result.add("test3", ValidationLevel::Error("major issue".to_string()));

        let display = format!("{result}");
        assert!(display.contains("1/3"));
        assert_eq!(result.warnings(), vec!["test2: minor issue".to_string()]);
        assert_eq!(result.errors(), vec!["test3: major issue".to_string()]);
    }
}
