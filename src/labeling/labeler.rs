//! Applying compiled rules to windows.
//!
//! [`assign_labels`] is the pure core; [`Labeler`] wraps it for a whole
//! [`WindowDataset`] and builds the labeled subset and its report.

use super::{LabelReport, LabelRuleSet, WindowLabel};
use crate::dataset::{LabeledDataset, WindowDataset};
use crate::error::Result;
use chrono::NaiveDateTime;

/// Number of labeled windows echoed at debug level.
const EXAMPLE_LOG_LIMIT: usize = 10;

/// Label every timestamp with the first matching rule.
///
/// Pure function of its inputs: same timestamps and rules, same labels.
pub fn assign_labels(timestamps: &[NaiveDateTime], rules: &LabelRuleSet) -> Vec<WindowLabel> {
    timestamps.iter().map(|ts| rules.classify(ts)).collect()
}

/// Output of the labeling stage.
#[derive(Debug, Clone)]
pub struct LabelingOutput {
    /// Labeled subset plus the full label column
    pub dataset: LabeledDataset,
    /// Counts and breakdowns for reporting
    pub report: LabelReport,
}

/// Applies a compiled rule set to a window dataset.
#[derive(Debug, Clone, Default)]
pub struct Labeler {
    rules: LabelRuleSet,
}

impl Labeler {
    /// Create a labeler from compiled rules.
    pub fn new(rules: LabelRuleSet) -> Self {
        Self { rules }
    }

    /// Rules in use.
    pub fn rules(&self) -> &LabelRuleSet {
        &self.rules
    }

    /// Label `dataset` and split off the labeled subset.
    ///
    /// A dataset in which nothing matches is valid; it yields an empty
    /// labeled subset and a 0% labeled report.
    pub fn label(&self, dataset: &WindowDataset) -> Result<LabelingOutput> {
        let timestamps = dataset.timestamps();
        let period_ids = dataset.period_ids();
        let labels = assign_labels(&timestamps, &self.rules);

        for rule in self.rules.rules() {
            log::debug!(
                "Rule {} to {}: {} (idx: {})",
                rule.start,
                rule.end,
                rule.category,
                rule.index
            );
        }
        let mapping = self.rules.class_mapping();
        for (i, (ts, label)) in timestamps
            .iter()
            .zip(&labels)
            .enumerate()
            .filter(|(_, (_, label))| label.is_labeled())
            .take(EXAMPLE_LOG_LIMIT)
        {
            log::debug!(
                "Window {i}: {ts} (Period {}) -> {}",
                period_ids[i],
                mapping.label_name(*label)
            );
        }

        let report = LabelReport::compute(&timestamps, &period_ids, &labels);
        log::info!(
            "Labeled {} out of {} windows ({:.1}%)",
            report.labeled,
            report.total,
            report.labeled_ratio() * 100.0
        );

        let dataset = LabeledDataset::from_labels(dataset, labels, mapping.clone())?;
        Ok(LabelingOutput { dataset, report })
    }
}
