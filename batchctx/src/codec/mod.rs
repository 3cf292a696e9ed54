//! Execution context codecs.
//!
//! A [`ContextStrategy`] is one structured-encoding configuration. The
//! [`BackwardsCompatibleSerializer`] composes a current strategy with the
//! [`LegacyJsonStrategy`] and falls back to the latter when the former cannot
//! read a payload.

mod job_parameters_module;
mod legacy;
mod serializer;
pub mod type_ids;
mod typed;

mod integration_tests;

pub use job_parameters_module::JobParametersModule;
pub use legacy::{LegacyJsonConfig, LegacyJsonStrategy};
pub use serializer::BackwardsCompatibleSerializer;
pub use typed::{TypedJsonConfig, TypedJsonStrategy};

use crate::context::ExecutionContext;
use crate::errors::{DecodeError, Result};
use std::io::Write;

/// One structured-encoding configuration for execution contexts.
///
/// Implementations are configured at construction and never mutated
/// afterwards, so a shared reference can be used from any thread.
#[cfg_attr(test, mockall::automock)]
pub trait ContextStrategy: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Writes the context to the sink.
    fn encode(&self, context: &ExecutionContext, sink: &mut dyn Write) -> Result<()>;

    /// Decodes a complete JSON document.
    fn decode(&self, json: &str) -> std::result::Result<ExecutionContext, DecodeError>;
}

pub(crate) fn key_path(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}

pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

pub(crate) fn encode_double(value: f64, path: &str) -> Result<serde_json::Value> {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .ok_or_else(|| {
            crate::errors::CodecError::Encode(format!("non-finite double {value} at {path}"))
        })
}
