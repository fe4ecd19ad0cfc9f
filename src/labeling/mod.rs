//! Rule-based ground-truth labeling of windows.
//!
//! Labels come from declarative time ranges: "on 2025-08-04 between 17:30
//! and 18:15 the wearer was asleep". A window takes the category of the first
//! rule whose closed interval contains the window's start timestamp.
//!
//! # Overview
//!
//! - [`LabelRule`]: one `(date, start_time, end_time, category)` entry as written in config
//! - [`LabelRuleSet`]: rules compiled to instants, in declaration order
//! - [`WindowLabel`]: `Category(index)` or `Unlabeled`, never a magic number
//! - [`Labeler`]: applies a rule set to a [`crate::WindowDataset`]
//! - [`LabelReport`]: per-category, per-period and per-date counts
//!
//! # Example
//!
//! ```
//! use motion_dataset::labeling::{LabelRule, LabelRuleSet, WindowLabel};
//! use motion_dataset::loader::parse_timestamp;
//!
//! let rules = vec![LabelRule::new("2025-08-04", "17:30:00", "18:15:00", "sleep")];
//! let rule_set = LabelRuleSet::compile(&rules, None).unwrap();
//!
//! let ts = parse_timestamp("2025-08-04 17:45:00").unwrap();
//! assert_eq!(rule_set.classify(&ts), WindowLabel::Category(0));
//!
//! let ts = parse_timestamp("2025-08-04 19:00:00").unwrap();
//! assert_eq!(rule_set.classify(&ts), WindowLabel::Unlabeled);
//! ```
//!
//! # Overlapping Rules
//!
//! Rules may overlap. The earlier-declared rule wins; overlaps are logged as
//! warnings when the rule set is compiled but never rejected.

mod labeler;
mod report;
mod rules;

pub use labeler::{assign_labels, Labeler, LabelingOutput};
pub use report::{LabelReport, PeriodLabelCounts};
pub use rules::{CompiledRule, LabelRule, LabelRuleSet};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Core Types
// ============================================================================

/// Label assigned to a window.
///
/// `Unlabeled` is a distinct state, so category index 0 is always a real
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowLabel {
    /// No rule matched the window's start timestamp
    Unlabeled,

    /// Index into the [`ClassMapping`]
    Category(usize),
}

impl WindowLabel {
    /// Value used for unlabeled windows in the persisted `i64` label column.
    pub const UNLABELED_CODE: i64 = -1;

    /// Category index, if labeled.
    #[inline]
    pub fn category(&self) -> Option<usize> {
        match self {
            WindowLabel::Category(idx) => Some(*idx),
            WindowLabel::Unlabeled => None,
        }
    }

    /// Whether a rule matched.
    #[inline]
    pub fn is_labeled(&self) -> bool {
        matches!(self, WindowLabel::Category(_))
    }

    /// Encode for the persisted label column (`-1` when unlabeled).
    #[inline]
    pub fn to_code(&self) -> i64 {
        match self {
            WindowLabel::Category(idx) => *idx as i64,
            WindowLabel::Unlabeled => Self::UNLABELED_CODE,
        }
    }

    /// Decode a persisted label value; any negative value means unlabeled.
    #[inline]
    pub fn from_code(code: i64) -> Self {
        if code < 0 {
            WindowLabel::Unlabeled
        } else {
            WindowLabel::Category(code as usize)
        }
    }
}

impl From<Option<usize>> for WindowLabel {
    fn from(value: Option<usize>) -> Self {
        value.map_or(WindowLabel::Unlabeled, WindowLabel::Category)
    }
}

impl std::fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowLabel::Category(idx) => write!(f, "{idx}"),
            WindowLabel::Unlabeled => write!(f, "unlabeled"),
        }
    }
}

/// Ordered category names; a category's index is its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMapping {
    names: Vec<String>,
}

impl ClassMapping {
    /// Create a mapping from names in index order.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no categories.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of category `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Display name for a label, `"unlabeled"` for the unlabeled state.
    pub fn label_name(&self, label: WindowLabel) -> &str {
        match label {
            WindowLabel::Category(idx) => self.name(idx).unwrap_or("unknown"),
            WindowLabel::Unlabeled => "unlabeled",
        }
    }

    /// Index of category `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Category names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// `index → name` map, serialized as `{"0": "light", ...}` in JSON.
    pub fn to_index_map(&self) -> BTreeMap<usize, String> {
        self.names.iter().cloned().enumerate().collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_label_codes() {
        assert_eq!(WindowLabel::Category(0).to_code(), 0);
        assert_eq!(WindowLabel::Category(3).to_code(), 3);
        assert_eq!(WindowLabel::Unlabeled.to_code(), -1);

        assert_eq!(WindowLabel::from_code(0), WindowLabel::Category(0));
        assert_eq!(WindowLabel::from_code(-1), WindowLabel::Unlabeled);
    }

    #[test]
    fn test_category_zero_is_labeled() {
        let label = WindowLabel::Category(0);
        assert!(label.is_labeled());
        assert_eq!(label.category(), Some(0));
        assert!(!WindowLabel::Unlabeled.is_labeled());
        assert_eq!(WindowLabel::Unlabeled.category(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(WindowLabel::from(Some(2)), WindowLabel::Category(2));
        assert_eq!(WindowLabel::from(None), WindowLabel::Unlabeled);
    }

    #[test]
    fn test_class_mapping() {
        let mapping = ClassMapping::new(["light", "moderate-vigorous", "sedentary", "sleep"]);
        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.index_of("sleep"), Some(3));
        assert_eq!(mapping.index_of("running"), None);
        assert_eq!(mapping.name(1), Some("moderate-vigorous"));
        assert_eq!(mapping.label_name(WindowLabel::Category(0)), "light");
        assert_eq!(mapping.label_name(WindowLabel::Unlabeled), "unlabeled");

        let json = serde_json::to_string(&mapping.to_index_map()).unwrap();
        assert_eq!(
            json,
            r#"{"0":"light","1":"moderate-vigorous","2":"sedentary","3":"sleep"}"#
        );
    }
}
