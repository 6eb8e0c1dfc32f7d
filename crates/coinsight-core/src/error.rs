use thiserror::Error;

/// Validation and contract errors exposed by `coinsight-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("asset id cannot be empty")]
    EmptyAsset,
    #[error("asset id length {len} exceeds max {max}")]
    AssetTooLong { len: usize, max: usize },
    #[error("asset id contains invalid character '{ch}' at index {index}")]
    AssetInvalidChar { ch: char, index: usize },

    #[error("invalid series range '{value}', expected a positive day count or 'max'")]
    InvalidRange { value: String },
    #[error("invalid source '{value}', expected one of coingecko, binance")]
    InvalidSource { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("epoch milliseconds out of range: {value}")]
    TimestampOutOfRange { value: i64 },

    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' is not a valid decimal: '{value}'")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("question cannot be empty")]
    EmptyQuestion,

    #[error("config '{key}' has invalid value '{value}'")]
    InvalidConfig { key: &'static str, value: String },
}
