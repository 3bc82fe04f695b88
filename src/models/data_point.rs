//! Best-effort result value.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// One best effort: the index label where the window starts and the
/// windowed statistic. Both are NaN when no such window exists.
///
/// Compares like a plain `(index, value)` pair, with NaN equal to NaN so
/// that a missing point equals `(NaN, NaN)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct DataPoint {
    pub index: f64,
    pub value: f64,
}

impl DataPoint {
    pub fn new(index: f64, value: f64) -> Self {
        Self { index, value }
    }

    /// The `(NaN, NaN)` placeholder for an effort that could not be found.
    pub fn missing() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    pub fn is_missing(&self) -> bool {
        self.index.is_nan() && self.value.is_nan()
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.index, self.value)
    }
}

fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl PartialEq for DataPoint {
    fn eq(&self, other: &Self) -> bool {
        same(self.index, other.index) && same(self.value, other.value)
    }
}

impl PartialEq<(f64, f64)> for DataPoint {
    fn eq(&self, other: &(f64, f64)) -> bool {
        same(self.index, other.0) && same(self.value, other.1)
    }
}

/// Tuple ordering, except that points equal under `==` (NaN included)
/// compare as `Equal`.
impl PartialOrd for DataPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        self.as_tuple().partial_cmp(&other.as_tuple())
    }
}

impl From<(f64, f64)> for DataPoint {
    fn from((index, value): (f64, f64)) -> Self {
        Self::new(index, value)
    }
}

impl From<DataPoint> for (f64, f64) {
    fn from(point: DataPoint) -> Self {
        point.as_tuple()
    }
}

impl TryFrom<&[f64]> for DataPoint {
    type Error = AnalyticsError;

    fn try_from(fields: &[f64]) -> Result<Self, Self::Error> {
        match fields {
            [index, value] => Ok(Self::new(*index, *value)),
            _ => Err(AnalyticsError::Construction(format!(
                "DataPoint takes exactly 2 fields (index, value), got {}",
                fields.len()
            ))),
        }
    }
}
