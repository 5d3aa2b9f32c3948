// Hampel identifier: centered sliding-window median/MAD outlier replacement.
// Window statistics always come from the unmodified input, so a replacement never
// feeds into a neighbour's window. A zero MAD does not disable detection: in a window
// that is constant apart from one point, that point is flagged.

use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Scales a MAD to a standard-deviation estimate for normally distributed data.
pub const MAD_SCALE: f64 = 1.4826;
pub const DEFAULT_WINDOW_HALF_WIDTH: usize = 10;
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// What happens to a point flagged as an outlier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierPolicy {
    /// Replace with the local window median.
    #[default]
    ReplaceWithMedian,
    /// Blank the cell (it becomes a gap).
    MarkMissing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HampelFilter {
    window_half_width: usize,
    threshold: f64,
    policy: OutlierPolicy,
}

impl Default for HampelFilter {
    fn default() -> Self {
        Self {
            window_half_width: DEFAULT_WINDOW_HALF_WIDTH,
            threshold: DEFAULT_THRESHOLD,
            policy: OutlierPolicy::default(),
        }
    }
}

impl HampelFilter {
    /// `window_half_width` is L (window spans up to 2L+1 positions); `threshold` is k,
    /// in scaled-MAD units.
    pub fn new(window_half_width: usize, threshold: f64) -> Result<Self> {
        if window_half_width < 1 {
            return Err(PipelineError::Configuration(
                "window_half_width must be >= 1, got 0".into(),
            ));
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(PipelineError::Configuration(format!(
                "threshold must be a finite number >= 0, got {}",
                threshold
            )));
        }
        Ok(Self {
            window_half_width,
            threshold,
            policy: OutlierPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: OutlierPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn window_half_width(&self) -> usize {
        self.window_half_width
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn policy(&self) -> OutlierPolicy {
        self.policy
    }

    /// Outlier mask: `true` where the point lies more than k scaled MADs from its window
    /// median. Gaps are never flagged.
    pub fn detect(&self, series: &[Option<f64>]) -> Vec<bool> {
        (0..series.len())
            .map(|i| self.local_median_if_outlier(series, i).is_some())
            .collect()
    }

    /// Returns a series of the same length with outliers handled per the policy.
    /// Gaps stay gaps; series of length 0 or 1 come back unchanged.
    pub fn filter(&self, series: &[Option<f64>]) -> Vec<Option<f64>> {
        (0..series.len())
            .map(|i| match self.local_median_if_outlier(series, i) {
                None => series[i],
                Some(median) => match self.policy {
                    OutlierPolicy::ReplaceWithMedian => Some(median),
                    OutlierPolicy::MarkMissing => None,
                },
            })
            .collect()
    }

    /// Window median when `series[i]` is an outlier, else `None`.
    fn local_median_if_outlier(&self, series: &[Option<f64>], i: usize) -> Option<f64> {
        let x = series[i]?;
        let lo = i.saturating_sub(self.window_half_width);
        let hi = (i + self.window_half_width).min(series.len() - 1);
        let window: Vec<f64> = series[lo..=hi].iter().flatten().copied().collect();

        let m = median(window.clone())?;
        let deviations = window.iter().map(|v| (v - m).abs()).collect();
        let sigma = MAD_SCALE * median(deviations)?;

        // Strict comparison: a point equal to a zero-spread window median is never flagged.
        if (x - m).abs() > self.threshold * sigma {
            Some(m)
        } else {
            None
        }
    }
}

/// Median; mean of the two middle values for even lengths. `None` when empty.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n.is_multiple_of(2) {
        Some((values[n / 2 - 1] + values[n / 2]) * 0.5)
    } else {
        Some(values[n / 2])
    }
}
