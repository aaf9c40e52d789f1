use thiserror::Error;

/// Failures surfaced by the unlock schedule, day content and reveal storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountdownError {
    /// Requested day is not part of the configured schedule
    #[error("day {day} is outside the configured range 1..={total}")]
    InvalidDayIndex { day: u32, total: u32 },

    /// Schedule constants cannot produce a valid unlock instant
    #[error("invalid unlock schedule: {0}")]
    InvalidSchedule(String),

    /// Day content does not match the schedule
    #[error("invalid day content: {0}")]
    Content(String),

    /// Durable key-value storage could not be read or written
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}
