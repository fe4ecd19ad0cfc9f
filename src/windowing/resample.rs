//! Linear-interpolation resampling onto a uniform grid.
//!
//! Raw wearable samples arrive at an irregular, device-dependent rate. Each
//! admitted window is mapped onto exactly `target_samples` evenly spaced
//! points so that every window has the same `(target_samples, 3)` shape.
//!
//! # Algorithm
//!
//! ```text
//! offsets:  t_i = (ts_i - ts_0) in seconds          (raw, ascending)
//! span:     t_last
//! grid:     g_k = k * span / (target_samples - 1),  k = 0..target_samples
//! value:    v(g_k) = linear interpolation of (t_i, v_i), clamped at both ends
//! ```
//!
//! Each axis is interpolated independently. No extrapolation happens beyond
//! the observed range, so the output is finite whenever the input is.

use crate::config::nanos_to_secs;
use crate::loader::Sample;

/// `n` evenly spaced points over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|k| start + k as f64 * step).collect();
            // Pin the last point to avoid accumulated rounding past `end`
            points[n - 1] = end;
            points
        }
    }
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be non-decreasing and the same length as `fp`. Values outside
/// `[xp[0], xp[last]]` are clamped to the boundary values. When several `xp`
/// coincide, the last of them wins. Returns NaN for empty input.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x < xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    // xp[j - 1] <= x < xp[j], so the segment has positive width
    let j = xp[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (y0, y1) = (fp[j - 1], fp[j]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Resamples raw window samples to a fixed row count.
#[derive(Debug, Clone, Copy)]
pub struct Resampler {
    target_samples: usize,
}

impl Resampler {
    /// Create a resampler producing `target_samples` rows per window.
    pub fn new(target_samples: usize) -> Self {
        Self { target_samples }
    }

    /// Rows produced per window.
    #[inline]
    pub fn target_samples(&self) -> usize {
        self.target_samples
    }

    /// Resample `raw` (ascending by timestamp) to `target_samples` rows.
    pub fn resample(&self, raw: &[Sample]) -> Vec<[f64; 3]> {
        resample_window(raw, self.target_samples)
    }
}

/// Resample `raw` (ascending by timestamp) to exactly `target_samples` rows.
///
/// If `raw` already has `target_samples` samples the values are returned
/// unchanged. An empty `raw` yields NaN rows, which the quality check flags.
pub fn resample_window(raw: &[Sample], target_samples: usize) -> Vec<[f64; 3]> {
    if raw.len() == target_samples {
        return raw.iter().map(Sample::xyz).collect();
    }
    if raw.is_empty() {
        return vec![[f64::NAN; 3]; target_samples];
    }

    let origin = raw[0].epoch_nanos();
    let offsets: Vec<f64> = raw
        .iter()
        .map(|s| nanos_to_secs(s.epoch_nanos() - origin))
        .collect();
    let span = offsets[offsets.len() - 1];
    let grid = linspace(0.0, span, target_samples);

    let xs: Vec<f64> = raw.iter().map(|s| s.x).collect();
    let ys: Vec<f64> = raw.iter().map(|s| s.y).collect();
    let zs: Vec<f64> = raw.iter().map(|s| s.z).collect();

    grid.iter()
        .map(|&t| {
            [
                interp(t, &offsets, &xs),
                interp(t, &offsets, &ys),
                interp(t, &offsets, &zs),
            ]
        })
        .collect()
}
