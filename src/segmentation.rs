//! Gap-based segmentation of a recording into continuous periods.
//!
//! A wearable only records while it is worn and connected, so the raw stream
//! is a sequence of bursts separated by collection gaps. Windows must never
//! straddle a gap, so the stream is first split wherever two consecutive
//! samples are further apart than the gap threshold.
//!
//! ```text
//!   samples:  ●●●●●●●●●●●          ●●●●●●●●●●●●●●●     ●
//!             └─ period 0 ─┘  gap  └── period 1 ──┘ gap (singleton dropped)
//! ```

use crate::config::{nanos_to_secs, secs_to_nanos, SegmentationConfig};
use crate::loader::Sample;
use chrono::NaiveDateTime;

/// A maximal run of samples whose consecutive gaps are within the threshold.
///
/// Indices are inclusive and refer to the sample slice the period was
/// detected on.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousPeriod {
    /// Position in detection order (0-based)
    pub id: usize,
    /// Index of the first sample
    pub start_index: usize,
    /// Index of the last sample (inclusive)
    pub end_index: usize,
    /// Timestamp of the first sample
    pub start_time: NaiveDateTime,
    /// Timestamp of the last sample
    pub end_time: NaiveDateTime,
}

impl ContinuousPeriod {
    /// Number of samples in the period.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Duration from first to last sample in nanoseconds.
    pub fn duration_ns(&self) -> i64 {
        (self.end_time - self.start_time)
            .num_nanoseconds()
            .unwrap_or(i64::MAX)
    }

    /// Duration from first to last sample in seconds.
    pub fn duration_secs(&self) -> f64 {
        nanos_to_secs(self.duration_ns())
    }

    /// Observed sampling rate (samples per second), 0 for zero-length periods.
    pub fn effective_rate(&self) -> f64 {
        let duration = self.duration_secs();
        if duration > 0.0 {
            self.sample_count() as f64 / duration
        } else {
            0.0
        }
    }

    /// The samples belonging to this period.
    #[inline]
    pub fn samples<'a>(&self, samples: &'a [Sample]) -> &'a [Sample] {
        &samples[self.start_index..=self.end_index]
    }
}

/// Splits ordered samples into continuous periods.
#[derive(Debug, Clone, Default)]
pub struct SegmentDetector {
    config: SegmentationConfig,
}

impl SegmentDetector {
    /// Create a detector with the given configuration.
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Gap threshold in seconds.
    pub fn gap_threshold_secs(&self) -> f64 {
        self.config.gap_threshold_secs
    }

    /// Detect continuous periods in `samples` (must be ascending by timestamp).
    pub fn detect(&self, samples: &[Sample]) -> Vec<ContinuousPeriod> {
        detect_continuous_periods(samples, self.config.gap_threshold_secs)
    }
}

/// Detect continuous periods in ascending `samples`.
///
/// A gap strictly greater than `gap_threshold_secs` closes the running period
/// at the previous sample and opens a new one at the current sample. Periods
/// with fewer than two samples are discarded. An empty result is valid.
pub fn detect_continuous_periods(samples: &[Sample], gap_threshold_secs: f64) -> Vec<ContinuousPeriod> {
    let threshold_ns = secs_to_nanos(gap_threshold_secs);
    let mut periods = Vec::new();

    if samples.is_empty() {
        return periods;
    }

    let mut start = 0;
    let mut prev_ns = samples[0].epoch_nanos();

    for (i, sample) in samples.iter().enumerate().skip(1) {
        let ns = sample.epoch_nanos();
        if ns.saturating_sub(prev_ns) > threshold_ns {
            push_period(&mut periods, samples, start, i - 1);
            start = i;
        }
        prev_ns = ns;
    }
    push_period(&mut periods, samples, start, samples.len() - 1);

    log::info!("Detected {} continuous periods", periods.len());
    for period in &periods {
        log::debug!(
            "  Period {}: {} to {} ({:.1}s, {} samples, {:.1} Hz)",
            period.id,
            period.start_time,
            period.end_time,
            period.duration_secs(),
            period.sample_count(),
            period.effective_rate()
        );
    }

    periods
}

fn push_period(periods: &mut Vec<ContinuousPeriod>, samples: &[Sample], start: usize, end: usize) {
    if end <= start {
        log::debug!("Dropping isolated sample at {}", samples[start].timestamp);
        return;
    }
    periods.push(ContinuousPeriod {
        id: periods.len(),
        start_index: start,
        end_index: end,
        start_time: samples[start].timestamp,
        end_time: samples[end].timestamp,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::from_epoch_nanos;

    fn samples_at(offsets_ms: &[i64]) -> Vec<Sample> {
        let base = 1_754_300_000_000_000_000i64;
        offsets_ms
            .iter()
            .map(|&ms| Sample::new(from_epoch_nanos(base + ms * 1_000_000), 0.0, 0.0, 1.0))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_continuous_periods(&[], 5.0).is_empty());
    }

    #[test]
    fn test_single_sample_dropped() {
        let samples = samples_at(&[0]);
        assert!(detect_continuous_periods(&samples, 5.0).is_empty());
    }

    #[test]
    fn test_gap_equal_to_threshold_stays_continuous() {
        let samples = samples_at(&[0, 5_000, 10_000]);
        let periods = detect_continuous_periods(&samples, 5.0);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].sample_count(), 3);
    }

    #[test]
    fn test_split_and_ids() {
        let samples = samples_at(&[0, 1_000, 2_000, 20_000, 21_000]);
        let periods = detect_continuous_periods(&samples, 5.0);
        assert_eq!(periods.len(), 2);
        assert_eq!((periods[0].start_index, periods[0].end_index), (0, 2));
        assert_eq!((periods[1].start_index, periods[1].end_index), (3, 4));
        assert_eq!(periods[0].id, 0);
        assert_eq!(periods[1].id, 1);
    }

    #[test]
    fn test_isolated_singletons_between_gaps() {
        let samples = samples_at(&[0, 1_000, 60_000, 120_000, 121_000]);
        let periods = detect_continuous_periods(&samples, 5.0);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].end_index, 1);
        assert_eq!(periods[1].start_index, 3);
        assert_eq!(periods[1].id, 1);
    }

    #[test]
    fn test_derived_metrics() {
        let samples = samples_at(&[0, 500, 1_000, 1_500, 2_000]);
        let periods = SegmentDetector::default().detect(&samples);
        let period = &periods[0];
        assert_eq!(period.duration_ns(), 2_000_000_000);
        assert!((period.duration_secs() - 2.0).abs() < 1e-12);
        assert!((period.effective_rate() - 2.5).abs() < 1e-12);
        assert_eq!(period.samples(&samples).len(), 5);
    }

    #[test]
    fn test_zero_duration_rate() {
        let samples = samples_at(&[0, 0]);
        let periods = detect_continuous_periods(&samples, 5.0);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].effective_rate(), 0.0);
    }
}
