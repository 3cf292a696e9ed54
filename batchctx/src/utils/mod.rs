//! Utility functions for timestamp handling.

pub mod timestamps;

pub use timestamps::{from_epoch_millis, to_epoch_millis, Timestamp, TimestampError};
