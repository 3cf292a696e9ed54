//! Logging setup for hosts embedding the serializer.
//!
//! The serializer itself only emits `tracing` events; installing a
//! subscriber is left to the host. [`init_tracing`] is a convenience for
//! hosts that have none.

mod logging;

pub use logging::{init_tracing, LogFormat, LoggingConfig, LoggingInitError};
