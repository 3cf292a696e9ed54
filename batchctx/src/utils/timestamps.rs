//! Timestamp utilities for epoch-millisecond dates.
//!
//! Dates travel over the wire as milliseconds since the Unix epoch, the way
//! the batch framework has always written them.

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Errors that can occur during timestamp conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// The epoch value does not map to a representable date.
    #[error("Epoch millisecond value out of range: {0}")]
    OutOfRange(i64),
}

/// Converts milliseconds since the Unix epoch to a UTC timestamp.
///
/// # Examples
///
/// ```
/// use batchctx::utils::from_epoch_millis;
///
/// let ts = from_epoch_millis(1_700_000_000_000).unwrap();
/// assert_eq!(ts.timestamp_millis(), 1_700_000_000_000);
/// ```
///
/// # Errors
///
/// Returns `TimestampError::OutOfRange` if chrono cannot represent the instant.
pub fn from_epoch_millis(millis: i64) -> Result<Timestamp, TimestampError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(TimestampError::OutOfRange(millis))
}

/// Converts a UTC timestamp to milliseconds since the Unix epoch.
///
/// Sub-millisecond precision is truncated.
#[must_use]
pub fn to_epoch_millis(ts: &Timestamp) -> i64 {
    ts.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_from_epoch_millis() {
        let dt = from_epoch_millis(1_700_000_000_000).unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 11);
        assert_eq!(dt.day(), 14);
    }

    #[test]
    fn test_from_epoch_millis_negative() {
        let dt = from_epoch_millis(-1).unwrap();
        assert_eq!(dt.year(), 1969);
        assert_eq!(to_epoch_millis(&dt), -1);
    }

    #[test]
    fn test_from_epoch_millis_out_of_range() {
        assert_eq!(
            from_epoch_millis(i64::MAX),
            Err(TimestampError::OutOfRange(i64::MAX))
        );
    }

    #[test]
    fn test_to_epoch_millis_truncates() {
        let dt = Utc.timestamp_opt(1_700_000_000, 999_999).unwrap();
        assert_eq!(to_epoch_millis(&dt), 1_700_000_000_000);
    }
}
