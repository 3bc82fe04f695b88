//! Error types surfaced by the analytics engines.
//!
//! Every engine operation either fully succeeds or returns one of these.
//! Efforts that cannot be computed because the series is too short are
//! not errors; they come back as NaN-valued results instead.

use thiserror::Error;

/// Collected failures from the series validator.
///
/// All failing checks are kept in order so callers can match on any one of
/// them. `Display` joins them with newlines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join("\n"))]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    /// Build from the list of failing check messages.
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Individual failure messages, in check order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// True if any failure message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

/// Errors that can occur during analytics calculations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The workout series failed structural or range validation.
    #[error("Workout series is invalid:\n{0}")]
    Validation(#[from] ValidationError),

    /// A required column or athlete attribute is absent.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Unsupported algorithm name or out-of-range parameter.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A value type or table was built with the wrong shape.
    #[error("Construction failed: {0}")]
    Construction(String),
}

impl AnalyticsError {
    /// Missing column helper.
    pub fn missing_column(name: &str) -> Self {
        AnalyticsError::MissingData(format!("column '{}' is required", name))
    }

    /// Missing athlete attribute helper.
    pub fn missing_attribute(name: &str) -> Self {
        AnalyticsError::MissingData(format!("athlete attribute '{}' is not set", name))
    }
}

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
