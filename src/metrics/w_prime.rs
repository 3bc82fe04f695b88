//! W' balance: depletion and recovery of anaerobic work capacity.
//!
//! Balance starts at W' on the first sample. Work above CP depletes it and
//! time below CP lets it recover. The models differ in how recovery is
//! computed:
//!
//! - `Waterworth`: the accumulated deficit decays by e^(−Δt/τ) every
//!   sample, with one τ derived from the whole workout. Because the decay
//!   also runs above CP, the balance can creep back up while power sits
//!   only slightly above CP.
//! - `Skiba`: the same recursion, with τ recomputed at each sample from the
//!   power seen so far. Needs no look-ahead, so it works on live data.
//! - `Froncioni`: recovery proportional to the power deficit below CP,
//!   scaled by how depleted the reserve is.
//!
//! All balances are clamped to `[0, W']`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::series::{MetricSeries, WorkoutSeries, POWER};

/// Recovery kinetics model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WPrimeAlgorithm {
    #[default]
    Waterworth,
    Skiba,
    Froncioni,
}

impl WPrimeAlgorithm {
    pub const ALL: [WPrimeAlgorithm; 3] = [
        WPrimeAlgorithm::Waterworth,
        WPrimeAlgorithm::Skiba,
        WPrimeAlgorithm::Froncioni,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WPrimeAlgorithm::Waterworth => "waterworth",
            WPrimeAlgorithm::Skiba => "skiba",
            WPrimeAlgorithm::Froncioni => "froncioni",
        }
    }
}

impl std::fmt::Display for WPrimeAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for WPrimeAlgorithm {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WPrimeAlgorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AnalyticsError::Configuration(format!(
                    "unsupported W' balance algorithm '{}' (expected waterworth, skiba or froncioni)",
                    s
                ))
            })
    }
}

/// Recovery time constant from the CP deficit of sub-CP efforts:
/// τ = 546·e^(−0.01·D_CP) + 316.
pub fn tau_from_dcp(dcp: f64) -> f64 {
    546.0 * (-0.01 * dcp).exp() + 316.0
}

/// Running mean of samples strictly below CP.
#[derive(Debug, Default, Clone, Copy)]
struct SubCpMean {
    sum: f64,
    count: u64,
}

impl SubCpMean {
    fn push(&mut self, power: f64, cp: f64) {
        if power < cp {
            self.sum += power;
            self.count += 1;
        }
    }

    /// τ for the samples seen so far. With no sub-CP samples, D_CP is 0.
    fn tau(&self, cp: f64) -> f64 {
        if self.count == 0 {
            return tau_from_dcp(0.0);
        }
        tau_from_dcp(cp - self.sum / self.count as f64)
    }
}

/// Computes CP-model recovery constants and W' balance series.
#[derive(Debug, Clone, Default)]
pub struct FatigueModelEngine {
    default_algorithm: WPrimeAlgorithm,
}

impl FatigueModelEngine {
    /// Engine defaulting to the Waterworth model.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &AnalyticsConfig) -> Self {
        Self {
            default_algorithm: config.fatigue.default_algorithm,
        }
    }

    pub fn default_algorithm(&self) -> WPrimeAlgorithm {
        self.default_algorithm
    }

    /// Whole-workout recovery constant τ in seconds for the given CP.
    pub fn compute_tau(&self, series: &WorkoutSeries, cp: f64) -> AnalyticsResult<f64> {
        let power = series.require_f64(POWER)?;

        let mut below = SubCpMean::default();
        for p in &power {
            below.push(*p, cp);
        }
        if below.count == 0 {
            tracing::warn!("No samples below CP {}; using τ for D_CP = 0", cp);
        }
        Ok(below.tau(cp))
    }

    /// W' balance with the engine's default algorithm.
    pub fn w_prime_balance(&self, series: &WorkoutSeries) -> AnalyticsResult<MetricSeries> {
        self.w_prime_balance_with(series, self.default_algorithm)
    }

    /// W' balance with an algorithm selected by name.
    pub fn w_prime_balance_named(
        &self,
        series: &WorkoutSeries,
        algorithm: &str,
    ) -> AnalyticsResult<MetricSeries> {
        self.w_prime_balance_with(series, algorithm.parse()?)
    }

    /// W' balance in joules, one value per sample, on the source index.
    pub fn w_prime_balance_with(
        &self,
        series: &WorkoutSeries,
        algorithm: WPrimeAlgorithm,
    ) -> AnalyticsResult<MetricSeries> {
        let power = series.require_f64(POWER)?;
        let athlete = series.athlete_snapshot();
        let cp = athlete.require_cp()?;
        let w_prime = athlete.require_w_prime()?;
        for (name, value) in [("cp", cp), ("w_prime", w_prime)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalyticsError::Configuration(format!(
                    "athlete {} must be positive, got {}",
                    name, value
                )));
            }
        }

        let dt = series.sample_interval();
        tracing::debug!(
            "Computing W' balance ({}) over {} samples, CP {} W, W' {} J",
            algorithm,
            power.len(),
            cp,
            w_prime
        );

        let values = match algorithm {
            WPrimeAlgorithm::Waterworth => {
                let tau = self.compute_tau(series, cp)?;
                balance_exponential(&power, cp, w_prime, dt, |_| tau)
            }
            WPrimeAlgorithm::Skiba => {
                let mut below = SubCpMean::default();
                balance_exponential(&power, cp, w_prime, dt, |p| {
                    below.push(p, cp);
                    below.tau(cp)
                })
            }
            WPrimeAlgorithm::Froncioni => balance_froncioni(&power, cp, w_prime, dt),
        };

        Ok(MetricSeries::new("w_prime_balance", series.index(), values))
    }
}

/// Exponential-forgetting deficit recursion:
/// `deficit = deficit · e^(−Δt/τ) + max(0, P − CP) · Δt`.
///
/// `tau_at` sees every sample in order, the first included, and returns
/// the τ to use for that sample. The deficit itself is not capped, so work
/// done after the balance hits 0 delays the visible recovery.
fn balance_exponential(
    power: &[f64],
    cp: f64,
    w_prime: f64,
    dt: f64,
    mut tau_at: impl FnMut(f64) -> f64,
) -> Vec<f64> {
    let mut deficit = 0.0;
    let mut balance = Vec::with_capacity(power.len());

    for (i, &p) in power.iter().enumerate() {
        let tau = tau_at(p);
        if i > 0 {
            deficit = deficit * (-dt / tau).exp() + (p - cp).max(0.0) * dt;
        }
        balance.push((w_prime - deficit).clamp(0.0, w_prime));
    }

    balance
}

/// Froncioni-Skiba-Clarke style recursion: linear depletion above CP,
/// recovery scaled by the remaining deficit below CP.
fn balance_froncioni(power: &[f64], cp: f64, w_prime: f64, dt: f64) -> Vec<f64> {
    let mut current = w_prime;
    let mut balance = Vec::with_capacity(power.len());

    for (i, &p) in power.iter().enumerate() {
        if i > 0 {
            current = if p < cp {
                current + (cp - p) * dt * (w_prime - current) / w_prime
            } else {
                current - (p - cp) * dt
            };
            current = current.clamp(0.0, w_prime);
        }
        balance.push(current);
    }

    balance
}

/// Summary statistics of a W' balance series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WPrimeSummary {
    /// Lowest balance reached, in joules.
    pub min_balance: f64,
    /// Index label where the lowest balance was first reached.
    pub min_at: f64,
    /// Deepest depletion as a fraction of W' (0-1).
    pub max_depletion: f64,
}

impl WPrimeSummary {
    /// Summarize a balance series. `None` for an empty series.
    pub fn from_balance(balance: &MetricSeries, w_prime: f64) -> Option<Self> {
        let (min_at, min_balance) = balance
            .iter()
            .fold(None, |best: Option<(f64, f64)>, (label, value)| match best {
                Some((_, b)) if b <= value => best,
                _ => Some((label, value)),
            })?;

        Some(Self {
            min_balance,
            min_at,
            max_depletion: if w_prime > 0.0 {
                (w_prime - min_balance) / w_prime
            } else {
                0.0
            },
        })
    }
}
