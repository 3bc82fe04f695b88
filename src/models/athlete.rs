//! Athlete profile and the shared handle workout series carry.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Biological sex, used by downstream zone/percentile lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
        }
    }
}

/// Physiological profile of an athlete.
///
/// Every attribute is optional. Engines that need one fail with
/// [`AnalyticsError::MissingData`] when it is unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    /// Display name
    pub name: Option<String>,
    pub sex: Option<Sex>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Date of birth
    pub dob: Option<NaiveDate>,
    /// Functional Threshold Power in watts
    pub ftp: Option<f64>,
    /// Critical Power in watts
    pub cp: Option<f64>,
    /// Anaerobic work capacity in joules
    pub w_prime: Option<f64>,
}

impl AthleteProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight = Some(weight_kg);
        self
    }

    pub fn with_dob(mut self, dob: NaiveDate) -> Self {
        self.dob = Some(dob);
        self
    }

    pub fn with_ftp(mut self, ftp: f64) -> Self {
        self.ftp = Some(ftp);
        self
    }

    pub fn with_cp(mut self, cp: f64) -> Self {
        self.cp = Some(cp);
        self
    }

    pub fn with_w_prime(mut self, w_prime: f64) -> Self {
        self.w_prime = Some(w_prime);
        self
    }

    /// Weight, or a missing-data error.
    pub fn require_weight(&self) -> AnalyticsResult<f64> {
        self.weight
            .ok_or_else(|| AnalyticsError::missing_attribute("weight"))
    }

    /// Critical power, or a missing-data error.
    pub fn require_cp(&self) -> AnalyticsResult<f64> {
        self.cp.ok_or_else(|| AnalyticsError::missing_attribute("cp"))
    }

    /// W', or a missing-data error.
    pub fn require_w_prime(&self) -> AnalyticsResult<f64> {
        self.w_prime
            .ok_or_else(|| AnalyticsError::missing_attribute("w_prime"))
    }
}

/// Shared, mutable handle to an [`AthleteProfile`].
///
/// Cloning the handle clones the reference, not the profile: every
/// workout series derived from the same root sees the same athlete, and
/// updates through any handle are visible to all of them.
#[derive(Debug, Clone, Default)]
pub struct SharedAthlete(Arc<RwLock<AthleteProfile>>);

impl SharedAthlete {
    pub fn new(profile: AthleteProfile) -> Self {
        Self(Arc::new(RwLock::new(profile)))
    }

    /// Copy of the profile as it is right now.
    pub fn snapshot(&self) -> AthleteProfile {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate the profile in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut AthleteProfile) -> R) -> R {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// True if both handles point at the same profile.
    pub fn ptr_eq(&self, other: &SharedAthlete) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<AthleteProfile> for SharedAthlete {
    fn from(profile: AthleteProfile) -> Self {
        Self::new(profile)
    }
}
