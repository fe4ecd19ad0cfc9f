use super::resample::Resampler;
use crate::config::{nanos_to_secs, WindowConfig};
use crate::dataset::WindowDataset;
use crate::error::{DatasetError, Result};
use crate::loader::{from_epoch_nanos, Sample};
use crate::segmentation::ContinuousPeriod;
use chrono::NaiveDateTime;
use rayon::prelude::*;

/// A fixed-duration, fixed-row-count slice of the motion signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Grid start of the window (not necessarily a sample timestamp)
    pub start: NaiveDateTime,

    /// Resampled `[x, y, z]` rows, always `target_samples` long
    pub samples: Vec<[f64; 3]>,

    /// Continuous period this window was cut from
    pub period_id: usize,
}

impl Window {
    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Windowing outcome for a single continuous period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodWindowStats {
    /// Period id
    pub period_id: usize,

    /// Period was shorter than one window and skipped entirely
    pub skipped_too_short: bool,

    /// Grid positions examined
    pub candidates: usize,

    /// Candidates dropped for insufficient coverage
    pub dropped_low_coverage: usize,

    /// Windows emitted
    pub emitted: usize,
}

/// Windowing diagnostics across all periods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowingStats {
    /// One entry per period, in period order
    pub per_period: Vec<PeriodWindowStats>,
}

impl WindowingStats {
    /// Number of periods examined.
    pub fn periods_total(&self) -> usize {
        self.per_period.len()
    }

    /// Periods skipped because they were shorter than one window.
    pub fn periods_skipped(&self) -> usize {
        self.per_period.iter().filter(|p| p.skipped_too_short).count()
    }

    /// Periods that contributed at least one window.
    pub fn periods_used(&self) -> usize {
        self.per_period.iter().filter(|p| p.emitted > 0).count()
    }

    /// Grid positions examined across all periods.
    pub fn candidates(&self) -> usize {
        self.per_period.iter().map(|p| p.candidates).sum()
    }

    /// Candidates dropped for insufficient coverage.
    pub fn dropped_low_coverage(&self) -> usize {
        self.per_period.iter().map(|p| p.dropped_low_coverage).sum()
    }

    /// Windows emitted across all periods.
    pub fn windows_emitted(&self) -> usize {
        self.per_period.iter().map(|p| p.emitted).sum()
    }
}

/// Tiles continuous periods into resampled, non-overlapping windows.
///
/// The grid for a period starts at its first timestamp and advances by the
/// window duration whether or not the previous candidate was admitted, so
/// window start times depend only on the period start.
#[derive(Debug, Clone)]
pub struct Windower {
    config: WindowConfig,
    resampler: Resampler,
}

impl Default for Windower {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl Windower {
    /// Create a windower from a window configuration.
    pub fn new(config: WindowConfig) -> Self {
        let resampler = Resampler::new(config.target_samples());
        Self { config, resampler }
    }

    /// Window configuration in use.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Rows per emitted window.
    pub fn target_samples(&self) -> usize {
        self.resampler.target_samples()
    }

    /// Cut one period into windows.
    ///
    /// `samples` is the full ascending sample slice the period was detected
    /// on. Short periods and low-coverage candidates are not errors; they
    /// only show up in the returned stats.
    pub fn window_period(
        &self,
        samples: &[Sample],
        period: &ContinuousPeriod,
    ) -> (Vec<Window>, PeriodWindowStats) {
        let mut stats = PeriodWindowStats {
            period_id: period.id,
            ..Default::default()
        };
        let mut windows = Vec::new();

        let period_samples = period.samples(samples);
        let duration_ns = self.config.duration_ns();

        if period.duration_ns() < duration_ns {
            log::warn!(
                "Skipping period {}: too short ({:.1}s)",
                period.id,
                period.duration_secs()
            );
            stats.skipped_too_short = true;
            return (windows, stats);
        }

        log::debug!(
            "Processing period {}: {:.1} Hz over {:.1}s",
            period.id,
            period.effective_rate(),
            period.duration_secs()
        );

        let nanos: Vec<i64> = period_samples.iter().map(Sample::epoch_nanos).collect();
        let period_end = nanos[nanos.len() - 1];
        let min_required = self.config.min_samples_required();

        let mut t = nanos[0];
        while t + duration_ns <= period_end {
            let window_end = t + duration_ns;
            stats.candidates += 1;

            // Half-open [t, window_end)
            let lo = nanos.partition_point(|&n| n < t);
            let hi = nanos.partition_point(|&n| n < window_end);
            let count = hi - lo;

            if count as f64 >= min_required {
                windows.push(Window {
                    start: from_epoch_nanos(t),
                    samples: self.resampler.resample(&period_samples[lo..hi]),
                    period_id: period.id,
                });
                stats.emitted += 1;
            } else {
                log::debug!(
                    "Dropping window at {}: {} samples < {:.0} required",
                    from_epoch_nanos(t),
                    count,
                    min_required
                );
                stats.dropped_low_coverage += 1;
            }

            t = window_end;
        }

        log::debug!(
            "Created {} windows from period {} ({} dropped)",
            stats.emitted,
            period.id,
            stats.dropped_low_coverage
        );

        (windows, stats)
    }

    /// Cut every period into windows and collect them in period order.
    ///
    /// # Errors
    ///
    /// `DatasetError::NoWindows` if no period produced a single window.
    pub fn window_periods(
        &self,
        samples: &[Sample],
        periods: &[ContinuousPeriod],
    ) -> Result<(WindowDataset, WindowingStats)> {
        let per_period: Vec<(Vec<Window>, PeriodWindowStats)> = if self.config.parallel_periods {
            periods
                .par_iter()
                .map(|period| self.window_period(samples, period))
                .collect()
        } else {
            periods
                .iter()
                .map(|period| self.window_period(samples, period))
                .collect()
        };

        let mut stats = WindowingStats::default();
        let mut windows = Vec::new();
        for (period_windows, period_stats) in per_period {
            windows.extend(period_windows);
            stats.per_period.push(period_stats);
        }

        if windows.is_empty() {
            return Err(DatasetError::NoWindows {
                periods: stats.periods_total(),
                candidates: stats.candidates(),
            });
        }

        log::info!(
            "Created {} windows of {} × 3 from {}/{} periods ({} candidates dropped, {} periods too short)",
            windows.len(),
            self.target_samples(),
            stats.periods_used(),
            stats.periods_total(),
            stats.dropped_low_coverage(),
            stats.periods_skipped()
        );
        log::debug!(
            "Window duration {:.1}s at {:.1} Hz",
            nanos_to_secs(self.config.duration_ns()),
            self.config.target_freq_hz
        );

        Ok((WindowDataset::new(windows, self.target_samples())?, stats))
    }
}
