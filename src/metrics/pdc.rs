//! Power Duration Curve (PDC) and power-derived workout metrics.
//!
//! The PDC holds the maximum average power a rider sustained for each
//! duration within one workout. This module provides:
//! - MMP (Mean Maximal Power) extraction from a workout series
//! - Normalized (weighted average) power
//! - Power-to-weight series
//! - Top-N non-overlapping best efforts for a duration

use serde::{Deserialize, Serialize};

use super::smoothing::{prefix_sums, window_means, NormalizedPowerCalculator};
use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::data_point::DataPoint;
use crate::models::series::{MetricSeries, WorkoutSeries, POWER};

/// A single point on the power duration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdcPoint {
    /// Duration in seconds.
    pub duration_secs: u32,
    /// Maximum average power at this duration (watts).
    pub power_watts: f64,
}

/// Power Duration Curve - collection of max power values at each duration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerDurationCurve {
    /// PDC points, sorted by duration.
    points: Vec<PdcPoint>,
}

impl PowerDurationCurve {
    /// Create an empty PDC.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create PDC from existing points.
    pub fn from_points(mut points: Vec<PdcPoint>) -> Self {
        points.sort_by_key(|p| p.duration_secs);
        Self { points }
    }

    /// Power at exactly `duration_secs`, if it was computed.
    pub fn get(&self, duration_secs: u32) -> Option<f64> {
        self.points
            .binary_search_by_key(&duration_secs, |p| p.duration_secs)
            .ok()
            .map(|i| self.points[i].power_watts)
    }

    /// Power at a duration, interpolating linearly between computed
    /// durations. Durations beyond the longest computed one return `None`.
    pub fn power_at(&self, duration_secs: u32) -> Option<f64> {
        if let Some(power) = self.get(duration_secs) {
            return Some(power);
        }

        let upper_idx = self
            .points
            .iter()
            .position(|p| p.duration_secs > duration_secs)?;
        let upper = self.points[upper_idx];

        match upper_idx.checked_sub(1).map(|i| self.points[i]) {
            Some(lower) => {
                let ratio = (duration_secs - lower.duration_secs) as f64
                    / (upper.duration_secs - lower.duration_secs) as f64;
                Some(lower.power_watts + ratio * (upper.power_watts - lower.power_watts))
            }
            // Shorter than any computed duration: the shortest effort bounds it.
            None => Some(upper.power_watts),
        }
    }

    /// Get all points for charting.
    pub fn points(&self) -> &[PdcPoint] {
        &self.points
    }

    /// Check if PDC is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Get max duration with actual data.
    pub fn max_duration(&self) -> Option<u32> {
        self.points.last().map(|p| p.duration_secs)
    }
}

/// Computes power curves and power-derived metrics from workout series.
#[derive(Debug, Clone)]
pub struct PowerCurveEngine {
    /// Rolling window for normalized power, in samples.
    np_window: usize,
}

impl PowerCurveEngine {
    /// Engine with the standard 30-sample normalized power window.
    pub fn new() -> Self {
        Self { np_window: 30 }
    }

    pub fn with_config(config: &AnalyticsConfig) -> Self {
        Self {
            np_window: config.power.normalized_power_window,
        }
    }

    /// Mean maximal power for every duration from 1 sample to the series
    /// length.
    pub fn mean_max_power(&self, series: &WorkoutSeries) -> AnalyticsResult<PowerDurationCurve> {
        let power = series.require_f64(POWER)?;
        tracing::debug!("Computing mean max power over {} samples", power.len());

        let prefix = prefix_sums(&power);
        let points = (1..=power.len())
            .map(|window| PdcPoint {
                duration_secs: window as u32,
                power_watts: best_window_mean(&prefix, window),
            })
            .collect();

        Ok(PowerDurationCurve { points })
    }

    /// Mean maximal power for selected durations only.
    ///
    /// Durations longer than the series are skipped.
    pub fn mean_max_power_for(
        &self,
        series: &WorkoutSeries,
        durations: &[u32],
    ) -> AnalyticsResult<PowerDurationCurve> {
        if durations.contains(&0) {
            return Err(AnalyticsError::Configuration(
                "durations must be at least 1 second".to_string(),
            ));
        }
        let power = series.require_f64(POWER)?;
        let prefix = prefix_sums(&power);

        let points = durations
            .iter()
            .filter(|&&d| d as usize <= power.len())
            .map(|&d| PdcPoint {
                duration_secs: d,
                power_watts: best_window_mean(&prefix, d as usize),
            })
            .collect();

        Ok(PowerDurationCurve::from_points(points))
    }

    /// Normalized (weighted average) power. NaN if the series is shorter
    /// than one full window.
    pub fn weighted_average_power(&self, series: &WorkoutSeries) -> AnalyticsResult<f64> {
        let power = series.require_f64(POWER)?;

        let mut np_calc = NormalizedPowerCalculator::with_window(self.np_window);
        let np = power
            .iter()
            .fold(None, |_, p| np_calc.add(*p))
            .unwrap_or(f64::NAN);

        if np.is_nan() {
            tracing::warn!(
                "Normalized power undefined: {} samples, window {}",
                power.len(),
                self.np_window
            );
        }
        Ok(np)
    }

    /// Power divided by the athlete's weight, in W/kg.
    pub fn power_per_kg(&self, series: &WorkoutSeries) -> AnalyticsResult<MetricSeries> {
        let power = series.require_f64(POWER)?;
        let weight = series.athlete_snapshot().require_weight()?;
        if !weight.is_finite() || weight <= 0.0 {
            return Err(AnalyticsError::Configuration(format!(
                "athlete weight must be positive, got {}",
                weight
            )));
        }

        let values = power.iter().map(|p| p / weight).collect();
        Ok(MetricSeries::new("power_per_kg", series.index(), values))
    }

    /// The `amount` best non-overlapping `duration`-sample efforts,
    /// strongest first.
    ///
    /// Each entry holds the index label where the window starts and its
    /// mean power. Slots that cannot be filled are `(NaN, NaN)`.
    pub fn compute_mean_max_bests(
        &self,
        series: &WorkoutSeries,
        duration: usize,
        amount: usize,
    ) -> AnalyticsResult<Vec<DataPoint>> {
        if duration == 0 || amount == 0 {
            return Err(AnalyticsError::Configuration(format!(
                "duration and amount must be positive (got duration {}, amount {})",
                duration, amount
            )));
        }
        let power = series.require_f64(POWER)?;
        let labels = series.labels();

        let means = window_means(&power, duration);
        let mut candidates: Vec<usize> = (0..means.len()).filter(|&i| !means[i].is_nan()).collect();
        // Highest mean first; ties go to the earliest offset.
        candidates.sort_by(|&a, &b| means[b].total_cmp(&means[a]).then(a.cmp(&b)));

        let mut picked: Vec<usize> = Vec::with_capacity(amount);
        for offset in candidates {
            if picked.len() == amount {
                break;
            }
            if picked.iter().all(|&p| offset.abs_diff(p) >= duration) {
                picked.push(offset);
            }
        }

        if picked.len() < amount {
            tracing::debug!(
                "Only {} of {} non-overlapping {}-sample efforts fit",
                picked.len(),
                amount,
                duration
            );
        }

        let mut bests: Vec<DataPoint> = picked
            .iter()
            .map(|&offset| DataPoint::new(labels[offset], means[offset]))
            .collect();
        bests.resize(amount, DataPoint::missing());
        Ok(bests)
    }
}

impl Default for PowerCurveEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest mean over all `window`-sample windows, from prefix sums.
fn best_window_mean(prefix: &[f64], window: usize) -> f64 {
    let n = prefix.len() - 1;
    (window..=n)
        .map(|end| prefix[end] - prefix[end - window])
        .fold(f64::NEG_INFINITY, f64::max)
        / window as f64
}
