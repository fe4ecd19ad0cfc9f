//! Fixed-grid windowing of continuous periods.
//!
//! Each continuous period is tiled with non-overlapping windows of
//! `duration_secs`. A candidate window is admitted only when it holds at
//! least `min_coverage_fraction × target_samples` raw samples; admitted
//! windows are resampled to exactly `target_samples` rows.
//!
//! # Architecture
//!
//! - **Windower**: grid iteration, coverage admission, per-period diagnostics
//! - **Resampler**: linear interpolation onto the uniform grid
//! - **Window**: output row block plus start time and source period
//!
//! # Example
//!
//! ```ignore
//! use motion_dataset::windowing::Windower;
//! use motion_dataset::config::WindowConfig;
//!
//! let windower = Windower::new(WindowConfig::default()); // 10s × 30Hz = 300 rows
//! let (dataset, stats) = windower.window_periods(&samples, &periods)?;
//!
//! println!("{} windows, {} candidates dropped", dataset.len(), stats.dropped_low_coverage());
//! ```

mod builder;
pub mod resample;

pub use builder::{PeriodWindowStats, Window, Windower, WindowingStats};
pub use resample::{interp, linspace, resample_window, Resampler};
