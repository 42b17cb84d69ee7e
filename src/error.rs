//! Record-level faults raised while ingesting trips or handling control input.

/// Errors that reject a single record or parameter without aborting the pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TrafficError {
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),
    #[error("Unparseable timestamp in `{field}`: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("Minute of day out of range (expected -1 or 0..=1439): {0}")]
    MinuteOutOfRange(i32),
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}
