//! Power curve and fatigue model calculations.

pub mod critical_power;
pub mod pdc;
pub mod smoothing;
pub mod w_prime;

pub use critical_power::{CpFitError, CpFitter, CpModel};
pub use pdc::{PdcPoint, PowerCurveEngine, PowerDurationCurve};
pub use smoothing::{NormalizedPowerCalculator, RollingAverage};
pub use w_prime::{FatigueModelEngine, WPrimeAlgorithm, WPrimeSummary};
