use chrono::NaiveDate;
use thiserror::Error;

/// Input-contract violations raised by the engine.
///
/// Warm-up periods, invalid window pairs in a sweep and short histories are
/// not errors; they surface as `None` in the produced series.
#[derive(Debug, Error, PartialEq)]
pub enum BacktestError {
    #[error("price series is empty")]
    EmptyPriceSeries,

    #[error("close at index {index} ({date}) must be positive and finite, got {close}")]
    InvalidClose {
        index: usize,
        date: NaiveDate,
        close: f64,
    },

    #[error("date at index {index} ({date}) is not after the previous date {previous}")]
    UnorderedDates {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },

    #[error("{name} window must be at least 1")]
    ZeroWindow { name: &'static str },

    #[error("signal has {actual} values but the price series has {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, BacktestError>;
