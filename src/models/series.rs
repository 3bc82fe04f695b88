//! Time-indexed workout table.
//!
//! A [`WorkoutSeries`] is an ordered table of numeric columns sharing one
//! index. It is built from raw columns, then indexed by `time`. Every
//! subsetting operation returns a new series holding the same
//! [`SharedAthlete`] as its source.

use std::ops::{Range, RangeInclusive};

use serde::{Deserialize, Serialize};

use super::athlete::{AthleteProfile, SharedAthlete};
use crate::error::{AnalyticsError, AnalyticsResult};

/// Well-known column names.
pub const TIME: &str = "time";
pub const POWER: &str = "power";
pub const HEARTRATE: &str = "heartrate";
pub const CADENCE: &str = "cadence";
pub const DISTANCE: &str = "distance";

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Int,
    Float,
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dtype::Int => write!(f, "int64"),
            Dtype::Float => write!(f, "float64"),
        }
    }
}

/// Column samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ColumnValues {
    pub fn dtype(&self) -> Dtype {
        match self {
            ColumnValues::Int(_) => Dtype::Int,
            ColumnValues::Float(_) => Dtype::Float,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at a position, widened to f64.
    pub fn get_f64(&self, pos: usize) -> Option<f64> {
        match self {
            ColumnValues::Int(v) => v.get(pos).map(|x| *x as f64),
            ColumnValues::Float(v) => v.get(pos).copied(),
        }
    }

    /// All values widened to f64.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            ColumnValues::Int(v) => v.iter().map(|x| *x as f64).collect(),
            ColumnValues::Float(v) => v.clone(),
        }
    }

    fn take(&self, positions: &[usize]) -> ColumnValues {
        match self {
            ColumnValues::Int(v) => ColumnValues::Int(positions.iter().map(|&i| v[i]).collect()),
            ColumnValues::Float(v) => {
                ColumnValues::Float(positions.iter().map(|&i| v[i]).collect())
            }
        }
    }

    fn slice(&self, range: Range<usize>) -> ColumnValues {
        match self {
            ColumnValues::Int(v) => ColumnValues::Int(v[range].to_vec()),
            ColumnValues::Float(v) => ColumnValues::Float(v[range].to_vec()),
        }
    }
}

impl From<Vec<i64>> for ColumnValues {
    fn from(values: Vec<i64>) -> Self {
        ColumnValues::Int(values)
    }
}

impl From<Vec<f64>> for ColumnValues {
    fn from(values: Vec<f64>) -> Self {
        ColumnValues::Float(values)
    }
}

/// A named column. Also used for the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: impl Into<ColumnValues>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
        }
    }

    pub fn dtype(&self) -> Dtype {
        self.values.dtype()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of the first entry equal to `label`.
    pub fn position_of(&self, label: i64) -> Option<usize> {
        match &self.values {
            ColumnValues::Int(v) => v.iter().position(|x| *x == label),
            ColumnValues::Float(v) => v.iter().position(|x| *x == label as f64),
        }
    }
}

/// Ordered, time-indexed numeric table with an attached athlete.
#[derive(Debug, Clone)]
pub struct WorkoutSeries {
    index: Column,
    columns: Vec<Column>,
    athlete: SharedAthlete,
}

impl WorkoutSeries {
    /// Build a raw table. The index is a default positional range named
    /// `index` until [`WorkoutSeries::set_index`] is called.
    pub fn from_columns(columns: Vec<Column>) -> AnalyticsResult<Self> {
        let len = columns.first().map(Column::len).unwrap_or(0);

        for (i, column) in columns.iter().enumerate() {
            if column.len() != len {
                return Err(AnalyticsError::Construction(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    len
                )));
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(AnalyticsError::Construction(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        Ok(Self {
            index: Column::new("index", (0..len as i64).collect::<Vec<_>>()),
            columns,
            athlete: SharedAthlete::default(),
        })
    }

    /// Empty table with no rows or columns.
    pub fn empty() -> Self {
        Self {
            index: Column::new("index", Vec::<i64>::new()),
            columns: Vec::new(),
            athlete: SharedAthlete::default(),
        }
    }

    /// Move the named column into the index.
    pub fn set_index(mut self, name: &str) -> AnalyticsResult<Self> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| AnalyticsError::missing_column(name))?;
        self.index = self.columns.remove(pos);
        Ok(self)
    }

    pub fn rename_index(mut self, name: &str) -> Self {
        self.index.name = name.to_string();
        self
    }

    /// Attach an athlete, sharing the handle.
    pub fn with_athlete(mut self, athlete: impl Into<SharedAthlete>) -> Self {
        self.athlete = athlete.into();
        self
    }

    pub fn set_athlete(&mut self, athlete: impl Into<SharedAthlete>) {
        self.athlete = athlete.into();
    }

    pub fn athlete(&self) -> &SharedAthlete {
        &self.athlete
    }

    /// Current state of the attached athlete.
    pub fn athlete_snapshot(&self) -> AthleteProfile {
        self.athlete.snapshot()
    }

    pub fn index(&self) -> &Column {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column values as f64, or a missing-data error naming the column.
    pub fn require_f64(&self, name: &str) -> AnalyticsResult<Vec<f64>> {
        self.column(name)
            .map(|c| c.values.to_f64())
            .ok_or_else(|| AnalyticsError::missing_column(name))
    }

    /// Add or replace a column.
    pub fn insert_column(&mut self, column: Column) -> AnalyticsResult<()> {
        if column.len() != self.len() {
            return Err(AnalyticsError::Construction(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.len()
            )));
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Drop a column, returning it if it existed.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let pos = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index step between the first two samples, in seconds. Defaults to
    /// 1 for series shorter than two samples.
    pub fn sample_interval(&self) -> f64 {
        match (self.index.values.get_f64(0), self.index.values.get_f64(1)) {
            (Some(a), Some(b)) => b - a,
            _ => 1.0,
        }
    }

    /// Index labels as f64.
    pub fn labels(&self) -> Vec<f64> {
        self.index.values.to_f64()
    }

    /// Rows at `range` (positional).
    pub fn slice(&self, range: Range<usize>) -> AnalyticsResult<Self> {
        if range.start > range.end || range.end > self.len() {
            return Err(AnalyticsError::Configuration(format!(
                "slice {}..{} out of bounds for {} rows",
                range.start,
                range.end,
                self.len()
            )));
        }
        Ok(self.derive(
            self.index.values.slice(range.clone()),
            self.columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values.slice(range.clone()),
                })
                .collect(),
        ))
    }

    /// Rows whose index label falls within `labels` (inclusive).
    pub fn slice_labels(&self, labels: RangeInclusive<i64>) -> Self {
        let (lo, hi) = (*labels.start() as f64, *labels.end() as f64);
        let positions: Vec<usize> = self
            .labels()
            .iter()
            .enumerate()
            .filter(|(_, l)| **l >= lo && **l <= hi)
            .map(|(i, _)| i)
            .collect();
        self.take_unchecked(&positions)
    }

    /// Rows at the given positions, in the given order.
    pub fn take(&self, positions: &[usize]) -> AnalyticsResult<Self> {
        if let Some(bad) = positions.iter().find(|&&p| p >= self.len()) {
            return Err(AnalyticsError::Configuration(format!(
                "position {} out of bounds for {} rows",
                bad,
                self.len()
            )));
        }
        Ok(self.take_unchecked(positions))
    }

    /// Rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> AnalyticsResult<Self> {
        if mask.len() != self.len() {
            return Err(AnalyticsError::Construction(format!(
                "mask has {} entries, expected {}",
                mask.len(),
                self.len()
            )));
        }
        let positions: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(i, _)| i)
            .collect();
        Ok(self.take_unchecked(&positions))
    }

    /// Subset of columns, in the requested order.
    pub fn select(&self, names: &[&str]) -> AnalyticsResult<Self> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name)
                    .cloned()
                    .ok_or_else(|| AnalyticsError::missing_column(name))
            })
            .collect::<AnalyticsResult<Vec<_>>>()?;
        Ok(self.derive(self.index.values.clone(), columns))
    }

    fn take_unchecked(&self, positions: &[usize]) -> Self {
        self.derive(
            self.index.values.take(positions),
            self.columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values.take(positions),
                })
                .collect(),
        )
    }

    fn derive(&self, index: ColumnValues, columns: Vec<Column>) -> Self {
        Self {
            index: Column {
                name: self.index.name.clone(),
                values: index,
            },
            columns,
            athlete: self.athlete.clone(),
        }
    }
}

/// Series-valued engine output sharing the source index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub name: String,
    index: Column,
    values: Vec<f64>,
}

impl MetricSeries {
    pub(crate) fn new(name: &str, index: &Column, values: Vec<f64>) -> Self {
        debug_assert_eq!(index.len(), values.len());
        Self {
            name: name.to_string(),
            index: index.clone(),
            values,
        }
    }

    /// Value at an index label.
    pub fn get(&self, label: i64) -> Option<f64> {
        self.index
            .position_of(label)
            .and_then(|pos| self.values.get(pos).copied())
    }

    /// Value at a position.
    pub fn at(&self, pos: usize) -> Option<f64> {
        self.values.get(pos).copied()
    }

    pub fn index(&self) -> &Column {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(label, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.len()).map(move |i| {
            (
                self.index.values.get_f64(i).unwrap_or(f64::NAN),
                self.values[i],
            )
        })
    }
}
