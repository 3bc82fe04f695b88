//! Rolling-window statistics over power samples.

use std::collections::VecDeque;

/// Mean of the last `window_size` samples.
#[derive(Debug)]
pub struct RollingAverage {
    buffer: VecDeque<f64>,
    window_size: usize,
    /// Sum of `buffer`
    sum: f64,
}

impl RollingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(window_size),
            window_size,
            sum: 0.0,
        }
    }

    /// Add a value, dropping the oldest once the window is full.
    pub fn push(&mut self, value: f64) {
        self.buffer.push_back(value);
        self.sum += value;

        if self.buffer.len() > self.window_size {
            if let Some(old) = self.buffer.pop_front() {
                self.sum -= old;
            }
        }
    }

    /// Average once the window is full, `None` before that.
    pub fn full_average(&self) -> Option<f64> {
        if self.is_full() {
            Some(self.sum / self.window_size as f64)
        } else {
            None
        }
    }

    /// True once `window_size` samples have been seen.
    pub fn is_full(&self) -> bool {
        self.window_size > 0 && self.buffer.len() >= self.window_size
    }
}

/// Means of every full `window`-sample window, in start order.
///
/// Uses prefix sums so each window costs O(1). Returns an empty vector
/// when `window` is zero or longer than `values`.
pub fn window_means(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return Vec::new();
    }
    let prefix = prefix_sums(values);
    (0..=values.len() - window)
        .map(|start| (prefix[start + window] - prefix[start]) / window as f64)
        .collect()
}

/// `prefix[i]` is the sum of `values[..i]`.
pub fn prefix_sums(values: &[f64]) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0);
    let mut sum = 0.0;
    for v in values {
        sum += v;
        prefix.push(sum);
    }
    prefix
}

/// Streaming normalized power.
///
/// NP = 4th root of average of (rolling average power)^4, counting only
/// full windows.
#[derive(Debug)]
pub struct NormalizedPowerCalculator {
    rolling_avg: RollingAverage,
    /// Σ (window mean)^4
    sum_fourth_power: f64,
    /// Number of full windows seen
    count: u64,
}

impl NormalizedPowerCalculator {
    /// Calculator with the standard 30-sample window.
    pub fn new() -> Self {
        Self::with_window(30)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            rolling_avg: RollingAverage::new(window),
            sum_fourth_power: 0.0,
            count: 0,
        }
    }

    /// Add a power sample and return the current NP.
    pub fn add(&mut self, power: f64) -> Option<f64> {
        self.rolling_avg.push(power);
        if let Some(avg) = self.rolling_avg.full_average() {
            self.sum_fourth_power += avg.powi(4);
            self.count += 1;
        }
        self.normalized_power()
    }

    /// Current NP, `None` until the first full window.
    pub fn normalized_power(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let avg_fourth_power = self.sum_fourth_power / self.count as f64;
        Some(avg_fourth_power.powf(0.25))
    }
}

impl Default for NormalizedPowerCalculator {
    fn default() -> Self {
        Self::new()
    }
}
