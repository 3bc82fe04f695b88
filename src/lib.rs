//! Wattline - workout analytics for power-meter data.
//!
//! Derives performance metrics from 1 Hz endurance workout series:
//! mean-max power curves, normalized power, power-to-weight, best
//! efforts, and W' balance under several recovery models. Series are
//! checked by [`SeriesValidator`] before analysis; the engines are pure
//! functions over an immutable [`WorkoutSeries`] and may run in parallel.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{AnalyticsConfig, ColumnBounds, ConfigError};
pub use error::{AnalyticsError, AnalyticsResult, ValidationError};
pub use metrics::{
    CpFitter, CpModel, FatigueModelEngine, PowerCurveEngine, PowerDurationCurve, WPrimeAlgorithm,
    WPrimeSummary,
};
pub use models::{AthleteProfile, Column, DataPoint, MetricSeries, SharedAthlete, WorkoutSeries};
pub use validation::SeriesValidator;
