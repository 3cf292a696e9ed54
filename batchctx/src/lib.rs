//! # Batchctx
//!
//! Backwards-compatible JSON serialization of batch job execution contexts.
//!
//! Execution contexts persisted by an older release of the batch framework
//! carry no type identifiers, while the current release tags every
//! non-trivial value. This crate reads both:
//!
//! - **Typed strategy**: decodes the current, type-identified format
//! - **Legacy strategy**: decodes the older untyped format, including its
//!   tagged job parameter representation
//! - **Fallback**: a failed typed decode is logged and retried with the
//!   legacy strategy against the same buffered payload
//!
//! Writing always uses the legacy format so that both releases can read it.
//!
//! ## Quick Start
//!
//! ```rust
//! use batchctx::prelude::*;
//!
//! let serializer = BackwardsCompatibleSerializer::new();
//! let legacy = r#"{"read.count": 250, "run": {"identifying": true, "type": "STRING", "value": "nightly"}}"#;
//!
//! let context = serializer.deserialize_str(legacy)?;
//! assert_eq!(context.get_long("read.count"), Some(250));
//! # Ok::<(), batchctx::errors::CodecError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod codec;
pub mod context;
pub mod errors;
pub mod observability;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codec::{
        BackwardsCompatibleSerializer, ContextStrategy, JobParametersModule, LegacyJsonConfig,
        LegacyJsonStrategy, TypedJsonConfig, TypedJsonStrategy,
    };
    pub use crate::context::{
        ContextValue, ExecutionContext, JobParameter, JobParameters, ParameterType,
        ParameterValue,
    };
    pub use crate::errors::{CodecError, DecodeError, DecodeErrorKind, UnrecognizedTagError};
    pub use crate::observability::{init_tracing, LogFormat, LoggingConfig};
    pub use crate::utils::{from_epoch_millis, to_epoch_millis, Timestamp};
}
