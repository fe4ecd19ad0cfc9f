//! Label distribution reporting.

use super::{ClassMapping, WindowLabel};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Label counts for a single continuous period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodLabelCounts {
    /// Windows from this period
    pub total: usize,
    /// Windows from this period that matched a rule
    pub labeled: usize,
    /// Labeled windows per category index
    pub per_category: BTreeMap<usize, usize>,
    /// First and last window start in this period
    pub time_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

/// Reporting side output of labeling. Never feeds back into the labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelReport {
    /// Windows examined
    pub total: usize,

    /// Windows that matched a rule
    pub labeled: usize,

    /// Labeled windows per category index
    pub per_category: BTreeMap<usize, usize>,

    /// Breakdown per source period
    pub per_period: BTreeMap<usize, PeriodLabelCounts>,

    /// Labeled windows per calendar date and category
    pub per_date: BTreeMap<NaiveDate, BTreeMap<usize, usize>>,

    /// First and last labeled window start
    pub labeled_span: Option<(NaiveDateTime, NaiveDateTime)>,
}

fn extend_range(
    range: &mut Option<(NaiveDateTime, NaiveDateTime)>,
    ts: NaiveDateTime,
) {
    *range = match *range {
        None => Some((ts, ts)),
        Some((lo, hi)) => Some((lo.min(ts), hi.max(ts))),
    };
}

impl LabelReport {
    /// Tally labels against their window timestamps and period ids.
    ///
    /// The three slices must be aligned; extra entries in any of them are
    /// ignored.
    pub fn compute(timestamps: &[NaiveDateTime], period_ids: &[usize], labels: &[WindowLabel]) -> Self {
        let mut report = LabelReport::default();

        for ((&ts, &period_id), label) in timestamps.iter().zip(period_ids).zip(labels) {
            report.total += 1;

            let period = report.per_period.entry(period_id).or_default();
            period.total += 1;
            extend_range(&mut period.time_range, ts);

            if let Some(idx) = label.category() {
                report.labeled += 1;
                *report.per_category.entry(idx).or_insert(0) += 1;
                period.labeled += 1;
                *period.per_category.entry(idx).or_insert(0) += 1;
                *report
                    .per_date
                    .entry(ts.date())
                    .or_default()
                    .entry(idx)
                    .or_insert(0) += 1;
                extend_range(&mut report.labeled_span, ts);
            }
        }

        report
    }

    /// Windows that matched no rule.
    pub fn unlabeled(&self) -> usize {
        self.total - self.labeled
    }

    /// Fraction of windows labeled, 0 for an empty dataset.
    pub fn labeled_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.labeled as f64 / self.total as f64
        }
    }

    /// Share of labeled windows in category `index`, in percent.
    pub fn category_percentage(&self, index: usize) -> f64 {
        if self.labeled == 0 {
            return 0.0;
        }
        let count = self.per_category.get(&index).copied().unwrap_or(0);
        count as f64 / self.labeled as f64 * 100.0
    }

    /// Human-readable multi-line breakdown.
    pub fn render(&self, mapping: &ClassMapping) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Labeled {} out of {} windows ({:.1}%)",
            self.labeled,
            self.total,
            self.labeled_ratio() * 100.0
        );
        let _ = writeln!(out, "Unlabeled windows: {}", self.unlabeled());

        let _ = writeln!(out, "\nLabel distribution:");
        for (&idx, &count) in &self.per_category {
            let _ = writeln!(
                out,
                "  {} (idx {}): {} windows ({:.1}%)",
                mapping.label_name(WindowLabel::Category(idx)),
                idx,
                count,
                self.category_percentage(idx)
            );
        }
        let unlabeled_pct = if self.total == 0 {
            0.0
        } else {
            self.unlabeled() as f64 / self.total as f64 * 100.0
        };
        let _ = writeln!(
            out,
            "  Unlabeled: {} windows ({:.1}%)",
            self.unlabeled(),
            unlabeled_pct
        );

        if let Some((first, last)) = self.labeled_span {
            let _ = writeln!(out, "\nLabeled data spans: {first} to {last}");
        }

        if !self.per_date.is_empty() {
            let _ = writeln!(out, "\nWindows per date:");
            for (date, categories) in &self.per_date {
                let total: usize = categories.values().sum();
                let _ = writeln!(out, "  {date}: {total} windows");
                for (&idx, &count) in categories {
                    let _ = writeln!(
                        out,
                        "    - {}: {} windows",
                        mapping.label_name(WindowLabel::Category(idx)),
                        count
                    );
                }
            }
        }

        if !self.per_period.is_empty() {
            let _ = writeln!(out, "\nLabeled windows by period:");
            for (period_id, counts) in &self.per_period {
                let _ = writeln!(
                    out,
                    "  Period {}: {}/{} windows labeled",
                    period_id, counts.labeled, counts.total
                );
                if let Some((first, last)) = counts.time_range {
                    let _ = writeln!(out, "    Time range: {first} to {last}");
                }
                for (&idx, &count) in &counts.per_category {
                    let _ = writeln!(
                        out,
                        "      - {}: {} windows",
                        mapping.label_name(WindowLabel::Category(idx)),
                        count
                    );
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_timestamp;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn sample_report() -> LabelReport {
        let timestamps = vec![
            at("2025-08-04 17:40:00"),
            at("2025-08-04 17:40:10"),
            at("2025-08-04 19:00:00"),
            at("2025-08-05 09:00:00"),
        ];
        let periods = vec![0, 0, 1, 2];
        let labels = vec![
            WindowLabel::Category(3),
            WindowLabel::Category(0),
            WindowLabel::Unlabeled,
            WindowLabel::Category(3),
        ];
        LabelReport::compute(&timestamps, &periods, &labels)
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.total, 4);
        assert_eq!(report.labeled, 3);
        assert_eq!(report.unlabeled(), 1);
        assert!((report.labeled_ratio() - 0.75).abs() < 1e-12);
        assert_eq!(report.per_category.get(&3), Some(&2));
        assert_eq!(report.per_category.get(&0), Some(&1));
        assert!((report.category_percentage(3) - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_period_and_date() {
        let report = sample_report();
        let period0 = &report.per_period[&0];
        assert_eq!((period0.labeled, period0.total), (2, 2));
        let period1 = &report.per_period[&1];
        assert_eq!((period1.labeled, period1.total), (0, 1));
        assert!(period1.per_category.is_empty());

        let aug4 = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        assert_eq!(report.per_date[&aug4].values().sum::<usize>(), 2);
        assert_eq!(
            report.labeled_span,
            Some((at("2025-08-04 17:40:00"), at("2025-08-05 09:00:00")))
        );
    }

    #[test]
    fn test_empty_report() {
        let report = LabelReport::compute(&[], &[], &[]);
        assert_eq!(report.labeled_ratio(), 0.0);
        assert_eq!(report.category_percentage(0), 0.0);
        assert!(report.labeled_span.is_none());
    }

    #[test]
    fn test_render_uses_names() {
        let mapping = ClassMapping::new(["light", "moderate-vigorous", "sedentary", "sleep"]);
        let text = sample_report().render(&mapping);
        assert!(text.contains("Labeled 3 out of 4 windows (75.0%)"));
        assert!(text.contains("sleep (idx 3): 2 windows"));
        assert!(text.contains("Period 1: 0/1 windows labeled"));
    }
}
