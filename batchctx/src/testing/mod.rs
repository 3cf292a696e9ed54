//! Testing utilities for execution context codecs.
//!
//! This module provides:
//! - A `tracing` layer that captures log records for assertions
//! - Sample payloads in the current and legacy formats
//! - Assertions over decoded contexts

mod assertions;
mod fixtures;
mod logs;

pub use assertions::{assert_context_has_key, assert_decode_kind, assert_job_parameter};
pub use fixtures::{legacy_payload, sample_context, typed_payload, LEGACY_JOB_PARAMETERS_KEY};
pub use logs::{CapturedLog, LogCapture};
