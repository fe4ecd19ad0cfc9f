//! Date/time label rules.
//!
//! Rules arrive from configuration as plain strings and are compiled once
//! into instants. Each rule covers a single calendar day: `date` applies to
//! both `start_time` and `end_time`, and the interval is closed on both ends.
//!
//! | Field | Format |
//! |-------|--------|
//! | `date` | `YYYY-MM-DD` |
//! | `start_time`, `end_time` | `HH:MM:SS` |
//! | `category` | free text, mapped to an index by [`ClassMapping`] |

use super::{ClassMapping, WindowLabel};
use crate::error::{DatasetError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A time-range rule as written in configuration.
///
/// Both times are on `date`; the interval is closed on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,

    /// Interval start, `HH:MM:SS`
    pub start_time: String,

    /// Interval end (inclusive), `HH:MM:SS`
    pub end_time: String,

    /// Category name
    pub category: String,
}

impl LabelRule {
    /// Create a rule from its textual parts.
    pub fn new(date: &str, start_time: &str, end_time: &str, category: &str) -> Self {
        Self {
            date: date.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            category: category.to_string(),
        }
    }
}

/// A rule resolved to instants and a category index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    /// Interval start on the rule's date
    pub start: NaiveDateTime,
    /// Interval end (inclusive)
    pub end: NaiveDateTime,
    /// Category name as configured
    pub category: String,
    /// Index of `category` in the class mapping
    pub index: usize,
}

impl CompiledRule {
    /// Closed-interval containment: `start <= ts <= end`.
    #[inline]
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.start <= *ts && *ts <= self.end
    }

    /// Whether the two closed intervals share at least one instant.
    #[inline]
    pub fn overlaps(&self, other: &CompiledRule) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Ordered, compiled label rules plus the category mapping they index into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelRuleSet {
    rules: Vec<CompiledRule>,
    class_mapping: ClassMapping,
}

fn parse_date(text: &str, rule_idx: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|e| DatasetError::config(format!("rule {rule_idx}: invalid date '{text}': {e}")))
}

fn parse_time(text: &str, rule_idx: usize) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M:%S%.f")
        .map_err(|e| DatasetError::config(format!("rule {rule_idx}: invalid time '{text}': {e}")))
}

impl LabelRuleSet {
    /// Compile rules in declaration order.
    ///
    /// With `categories` the class indices follow that list and every rule
    /// must name one of them. Without it the categories are the distinct rule
    /// categories sorted by name.
    ///
    /// # Errors
    ///
    /// `DatasetError::Config` for unparsable dates or times, an end before its
    /// start, duplicate or unknown categories.
    pub fn compile(rules: &[LabelRule], categories: Option<&[String]>) -> Result<Self> {
        let class_mapping = match categories {
            Some(names) => {
                let mut seen = BTreeSet::new();
                for name in names {
                    if !seen.insert(name.as_str()) {
                        return Err(DatasetError::config(format!(
                            "duplicate category '{name}'"
                        )));
                    }
                }
                ClassMapping::new(names.iter().cloned())
            }
            None => {
                let distinct: BTreeSet<&str> = rules.iter().map(|r| r.category.as_str()).collect();
                ClassMapping::new(distinct)
            }
        };

        let mut compiled: Vec<CompiledRule> = Vec::with_capacity(rules.len());
        for (i, rule) in rules.iter().enumerate() {
            let date = parse_date(&rule.date, i)?;
            let start = date.and_time(parse_time(&rule.start_time, i)?);
            let end = date.and_time(parse_time(&rule.end_time, i)?);

            if end < start {
                return Err(DatasetError::config(format!(
                    "rule {i}: end {end} is before start {start}"
                )));
            }

            let index = class_mapping.index_of(&rule.category).ok_or_else(|| {
                DatasetError::config(format!("rule {i}: unknown category '{}'", rule.category))
            })?;

            let candidate = CompiledRule {
                start,
                end,
                category: rule.category.clone(),
                index,
            };

            for (j, earlier) in compiled.iter().enumerate() {
                if earlier.overlaps(&candidate) {
                    log::warn!(
                        "Label rule {i} ({}) overlaps rule {j} ({}); rule {j} takes precedence",
                        candidate.category,
                        earlier.category
                    );
                }
            }

            compiled.push(candidate);
        }

        Ok(Self {
            rules: compiled,
            class_mapping,
        })
    }

    /// Label for a timestamp: first containing rule, else `Unlabeled`.
    pub fn classify(&self, ts: &NaiveDateTime) -> WindowLabel {
        self.rules
            .iter()
            .find(|rule| rule.contains(ts))
            .map_or(WindowLabel::Unlabeled, |rule| WindowLabel::Category(rule.index))
    }

    /// Compiled rules in declaration order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Category mapping the rules index into.
    pub fn class_mapping(&self) -> &ClassMapping {
        &self.class_mapping
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
