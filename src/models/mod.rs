//! Data model shared by the engines: athlete, workout series, best-effort
//! values.

pub mod athlete;
pub mod data_point;
pub mod series;

pub use athlete::{AthleteProfile, Sex, SharedAthlete};
pub use data_point::DataPoint;
pub use series::{Column, ColumnValues, Dtype, MetricSeries, WorkoutSeries};
