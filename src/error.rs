//! Error types.
//!
//! [`ModelError`] covers invalid problem input (rejected while building the
//! model or parsing adapter records). [`ScheduleError`] covers everything
//! that can go wrong while constructing or running a scheduler.

use rust_decimal::Decimal;
use thiserror::Error;

/// Invalid problem input.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("order {order_id}: value must be non-negative, got {value}")]
    NegativeValue { order_id: String, value: Decimal },

    #[error("order {order_id}: picking duration must be non-negative")]
    NegativeDuration { order_id: String },

    #[error("order {order_id}: picking duration must be a whole number of seconds")]
    SubSecondDuration { order_id: String },

    #[error("invalid decimal for {field}: {value:?}")]
    InvalidDecimal { field: String, value: String },

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("invalid time of day: {0:?}")]
    InvalidTime(String),

    #[error("picking start time {start} is after picking end time {end}")]
    ShiftWindow { start: String, end: String },

    #[error("duplicate order id: {0}")]
    DuplicateOrder(String),

    #[cfg(feature = "serde")]
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scheduler construction and execution errors.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("unknown optimization criteria: {0:?}")]
    UnknownCriteria(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),

    #[error("{strategy} scheduler built an invalid model: {reason}")]
    ModelInvalid { strategy: String, reason: String },

    #[error("{strategy} scheduler failed: {source}")]
    StrategyFailed {
        strategy: String,
        #[source]
        source: Box<ScheduleError>,
    },

    #[error("{strategy} scheduler panicked: {message}")]
    StrategyPanicked { strategy: String, message: String },

    #[error(transparent)]
    Input(#[from] ModelError),
}
