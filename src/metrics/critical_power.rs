//! Two-parameter critical power model.
//!
//! Maximal efforts between roughly 2 and 20 minutes lie on a straight line
//! in work-time space: `work = CP * t + W'`. Fitting that line to points of
//! a mean-max power curve gives CP (slope) and W' (intercept), which the
//! W' balance engine needs on the athlete.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pdc::PowerDurationCurve;
use crate::models::athlete::SharedAthlete;

/// Fitted CP and W'.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpModel {
    /// Watts.
    pub cp: f64,
    /// Joules.
    pub w_prime: f64,
    /// Coefficient of determination of the work-time fit.
    pub r_squared: f64,
}

#[derive(Debug, Error)]
pub enum CpFitError {
    #[error("Need at least 3 efforts in the fitting range, got {0}")]
    InsufficientData(usize),

    #[error("CP fit failed: {0}")]
    FittingFailed(String),
}

/// Fits a [`CpModel`] to efforts within a duration range.
#[derive(Debug, Clone)]
pub struct CpFitter {
    min_duration: u32,
    max_duration: u32,
}

impl CpFitter {
    /// Fits efforts from 2 to 20 minutes.
    pub fn new() -> Self {
        Self::with_range(120, 1200)
    }

    /// Fits efforts from `min_secs` to `max_secs`, both inclusive.
    pub fn with_range(min_secs: u32, max_secs: u32) -> Self {
        Self {
            min_duration: min_secs,
            max_duration: max_secs,
        }
    }

    /// Fit to the curve points whose duration is inside the range.
    pub fn fit(&self, pdc: &PowerDurationCurve) -> Result<CpModel, CpFitError> {
        let range = self.min_duration..=self.max_duration;
        let efforts: Vec<(u32, f64)> = pdc
            .points()
            .iter()
            .filter(|p| range.contains(&p.duration_secs))
            .map(|p| (p.duration_secs, p.power_watts))
            .collect();

        self.fit_points(&efforts)
    }

    /// Fit to `(duration_secs, watts)` efforts as given, ignoring the range.
    pub fn fit_points(&self, efforts: &[(u32, f64)]) -> Result<CpModel, CpFitError> {
        if efforts.len() < 3 {
            return Err(CpFitError::InsufficientData(efforts.len()));
        }

        let line = efforts
            .iter()
            .map(|&(secs, watts)| (secs as f64, watts * secs as f64))
            .fold(WorkTimeLine::default(), WorkTimeLine::push);
        let (cp, w_prime) = line.solve()?;

        if cp <= 0.0 || w_prime <= 0.0 {
            return Err(CpFitError::FittingFailed(format!(
                "non-physical fit (CP {:.1} W, W' {:.0} J)",
                cp, w_prime
            )));
        }

        let r_squared = line.r_squared(efforts, cp, w_prime);
        tracing::debug!(
            "Fitted CP {:.1} W, W' {:.0} J (R² {:.3}) from {} efforts",
            cp,
            w_prime,
            r_squared,
            efforts.len()
        );

        Ok(CpModel {
            cp,
            w_prime,
            r_squared,
        })
    }
}

impl Default for CpFitter {
    fn default() -> Self {
        Self::new()
    }
}

impl CpModel {
    /// How long `power_watts` can be held. `None` at or below CP.
    pub fn time_to_exhaustion(&self, power_watts: f64) -> Option<Duration> {
        (power_watts > self.cp)
            .then(|| Duration::from_secs_f64(self.w_prime / (power_watts - self.cp)))
    }

    /// Highest power sustainable for `duration`.
    pub fn power_at_duration(&self, duration: Duration) -> Option<f64> {
        let secs = duration.as_secs_f64();
        (secs > 0.0).then(|| self.cp + self.w_prime / secs)
    }

    /// Store CP and W' on the athlete.
    pub fn apply_to(&self, athlete: &SharedAthlete) {
        athlete.update(|profile| {
            profile.cp = Some(self.cp);
            profile.w_prime = Some(self.w_prime);
        });
    }
}

/// Least-squares sums for work (J) against time (s).
#[derive(Debug, Default, Clone, Copy)]
struct WorkTimeLine {
    n: f64,
    t: f64,
    work: f64,
    t_work: f64,
    t_t: f64,
}

impl WorkTimeLine {
    fn push(mut self, (t, work): (f64, f64)) -> Self {
        self.n += 1.0;
        self.t += t;
        self.work += work;
        self.t_work += t * work;
        self.t_t += t * t;
        self
    }

    /// (slope, intercept) of the least-squares line.
    fn solve(&self) -> Result<(f64, f64), CpFitError> {
        let spread = self.n * self.t_t - self.t * self.t;
        if spread.abs() < 1e-10 {
            return Err(CpFitError::FittingFailed(
                "all efforts have the same duration".to_string(),
            ));
        }

        let slope = (self.n * self.t_work - self.t * self.work) / spread;
        let intercept = (self.work - slope * self.t) / self.n;
        Ok((slope, intercept))
    }

    fn r_squared(&self, efforts: &[(u32, f64)], cp: f64, w_prime: f64) -> f64 {
        let mean_work = self.work / self.n;
        let (total, residual) = efforts.iter().fold((0.0, 0.0), |(tot, res), &(secs, watts)| {
            let t = secs as f64;
            let work = watts * t;
            (
                tot + (work - mean_work).powi(2),
                res + (work - (cp * t + w_prime)).powi(2),
            )
        });

        if total > 0.0 {
            1.0 - residual / total
        } else {
            0.0
        }
    }
}
