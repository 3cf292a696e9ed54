//! Backwards-compatible execution context serializer.

use super::{ContextStrategy, LegacyJsonConfig, LegacyJsonStrategy, TypedJsonStrategy};
use crate::context::ExecutionContext;
use crate::errors::{CodecError, DecodeError, DecodeErrorKind, Result};
use std::io::{Read, Write};
use tracing::{debug, info};

/// Reads contexts in both the current and the legacy format.
///
/// Writing always goes through the legacy strategy so that readers on either
/// side of the upgrade can load the result. Reading tries the current
/// strategy first and retries the same buffered payload with the legacy one.
///
/// # Example
///
/// ```
/// use batchctx::codec::BackwardsCompatibleSerializer;
/// use batchctx::context::{ExecutionContext, JobParameter};
///
/// let serializer = BackwardsCompatibleSerializer::new();
/// let ctx = ExecutionContext::new()
///     .with_entry("read.count", 120_i64)
///     .with_entry("run.id", JobParameter::long(7, true));
///
/// let json = serializer.serialize_to_string(&ctx).unwrap();
/// let decoded = serializer.deserialize_str(&json).unwrap();
/// assert_eq!(decoded, ctx);
/// ```
#[derive(Debug, Clone)]
pub struct BackwardsCompatibleSerializer<C = TypedJsonStrategy> {
    current: C,
    legacy: LegacyJsonStrategy,
}

impl BackwardsCompatibleSerializer<TypedJsonStrategy> {
    /// Creates a serializer with the default typed and legacy strategies.
    #[must_use]
    pub fn new() -> Self {
        Self::with_current(TypedJsonStrategy::default())
    }
}

impl Default for BackwardsCompatibleSerializer<TypedJsonStrategy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ContextStrategy> BackwardsCompatibleSerializer<C> {
    /// Creates a serializer around the given current strategy.
    #[must_use]
    pub fn with_current(current: C) -> Self {
        Self {
            current,
            legacy: LegacyJsonStrategy::default(),
        }
    }

    /// Replaces the legacy strategy configuration.
    #[must_use]
    pub fn with_legacy_config(mut self, config: LegacyJsonConfig) -> Self {
        self.legacy = LegacyJsonStrategy::new(config);
        self
    }

    /// Returns the current strategy.
    #[must_use]
    pub const fn current(&self) -> &C {
        &self.current
    }

    /// Returns the legacy strategy.
    #[must_use]
    pub const fn legacy(&self) -> &LegacyJsonStrategy {
        &self.legacy
    }

    /// Writes a context to a sink in the legacy format.
    ///
    /// Both arguments are required; a missing one is rejected before any
    /// bytes are written.
    pub fn serialize(
        &self,
        context: Option<&ExecutionContext>,
        sink: Option<&mut dyn Write>,
    ) -> Result<()> {
        let context = context.ok_or_else(|| CodecError::invalid_argument("A context is required"))?;
        let sink = sink.ok_or_else(|| CodecError::invalid_argument("An output sink is required"))?;

        self.legacy.encode(context, sink)?;
        sink.flush()?;
        Ok(())
    }

    /// Reads a context from a source, falling back to the legacy format.
    ///
    /// The whole source is buffered before the first attempt. Only a failure
    /// of the legacy attempt is returned to the caller.
    pub fn deserialize(&self, source: Option<&mut dyn Read>) -> Result<ExecutionContext> {
        let source = source.ok_or_else(|| CodecError::invalid_argument("An input source is required"))?;

        let mut payload = Vec::new();
        source.read_to_end(&mut payload)?;

        let json = String::from_utf8(payload).map_err(|e| {
            CodecError::decode(
                self.legacy.name(),
                DecodeError::new(
                    DecodeErrorKind::Malformed,
                    format!("payload is not valid UTF-8: {e}"),
                ),
            )
        })?;

        self.decode_with_fallback(&json)
    }

    /// Serializes a context into a string.
    pub fn serialize_to_string(&self, context: &ExecutionContext) -> Result<String> {
        let mut buf = Vec::new();
        self.serialize(Some(context), Some(&mut buf))?;
        String::from_utf8(buf).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Deserializes a context from a string, falling back to the legacy format.
    pub fn deserialize_str(&self, json: &str) -> Result<ExecutionContext> {
        self.decode_with_fallback(json)
    }

    fn decode_with_fallback(&self, json: &str) -> Result<ExecutionContext> {
        match self.current.decode(json) {
            Ok(context) => Ok(context),
            Err(primary) => {
                info!(
                    strategy = self.current.name(),
                    fallback = self.legacy.name(),
                    payload_bytes = json.len(),
                    "Couldn't deserialize execution context: will attempt to use legacy decoder"
                );
                debug!(
                    strategy = self.current.name(),
                    kind = %primary.kind,
                    path = %primary.path,
                    error = %primary,
                    "Primary decode failure"
                );

                self.legacy
                    .decode(json)
                    .map_err(|err| CodecError::decode(self.legacy.name(), err))
            }
        }
    }
}
