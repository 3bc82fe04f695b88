//! Structural and physiological validation of workout series.
//!
//! Every check runs; failures are collected and reported together in one
//! [`ValidationError`].

use crate::config::{AnalyticsConfig, ValidationSettings};
use crate::error::{AnalyticsResult, ValidationError};
use crate::models::series::{Column, ColumnValues, Dtype, WorkoutSeries};

/// Validates workout series against a set of rules.
#[derive(Debug, Clone, Default)]
pub struct SeriesValidator {
    settings: ValidationSettings,
}

impl SeriesValidator {
    /// Validator with the default rules (`time` index at 1 Hz, power in
    /// 0-3000 W, non-negative heart rate, cadence and distance).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    pub fn with_config(config: &AnalyticsConfig) -> Self {
        Self::with_settings(config.validation.clone())
    }

    pub fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Run all checks.
    pub fn validate(&self, series: &WorkoutSeries) -> Result<(), ValidationError> {
        let mut failures = Vec::new();

        self.check_index(series.index(), &mut failures);
        for column in series.columns() {
            self.check_column(column, &mut failures);
        }

        if failures.is_empty() {
            Ok(())
        } else {
            tracing::debug!("Series failed {} validation checks", failures.len());
            Err(ValidationError::new(failures))
        }
    }

    /// [`SeriesValidator::validate`] lifted into the crate error type.
    pub fn ensure_valid(&self, series: &WorkoutSeries) -> AnalyticsResult<()> {
        self.validate(series).map_err(Into::into)
    }

    fn check_index(&self, index: &Column, failures: &mut Vec<String>) {
        if index.name != self.settings.index_name {
            failures.push(format!(
                "Index is named '{}', expected '{}'",
                index.name, self.settings.index_name
            ));
        }

        if index.dtype() != Dtype::Int {
            failures.push(format!(
                "Index is not of dtype {} (found {})",
                Dtype::Int,
                index.dtype()
            ));
        }

        if !has_constant_step(&index.values, self.settings.sample_step) {
            failures.push(self.sample_rate_message());
        }
    }

    fn check_column(&self, column: &Column, failures: &mut Vec<String>) {
        if column.dtype() != Dtype::Int {
            failures.push(format!(
                "Column '{}' is not of dtype {} (found {})",
                column.name,
                Dtype::Int,
                column.dtype()
            ));
        }

        let Some(bounds) = self.settings.bounds.get(&column.name) else {
            return;
        };
        let values = column.values.to_f64();

        if let Some(min) = bounds.min {
            if values.iter().any(|v| *v < min) {
                failures.push(format!("Column '{}' has values < {}", column.name, min));
            }
        }
        if let Some(max) = bounds.max {
            if values.iter().any(|v| *v > max) {
                failures.push(format!("Column '{}' has values > {}", column.name, max));
            }
        }
    }

    fn sample_rate_message(&self) -> String {
        if self.settings.sample_step == 1 {
            "Sample rate is not (consistent) 1Hz".to_string()
        } else {
            format!(
                "Sample rate is not (consistent) one sample every {}s",
                self.settings.sample_step
            )
        }
    }
}

/// True if consecutive labels differ by exactly `step`.
fn has_constant_step(values: &ColumnValues, step: i64) -> bool {
    match values {
        ColumnValues::Int(v) => v.windows(2).all(|w| w[1].checked_sub(w[0]) == Some(step)),
        ColumnValues::Float(v) => v.windows(2).all(|w| w[1] - w[0] == step as f64),
    }
}
