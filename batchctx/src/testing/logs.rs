//! Log capture for tests.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Prefix of the targets this crate logs under.
const CRATE_TARGET: &str = env!("CARGO_PKG_NAME");

/// A captured log record.
#[derive(Debug, Clone)]
pub struct CapturedLog {
    /// The record's level.
    pub level: Level,
    /// The record's target (module path).
    pub target: String,
    /// The formatted message.
    pub message: String,
    /// Structured fields other than the message.
    pub fields: HashMap<String, String>,
}

/// Collects log records emitted by this crate while a closure runs.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<CapturedLog>>>,
}

impl LogCapture {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with a subscriber that records into this capture.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(CaptureLayer {
            records: Arc::clone(&self.records),
        });
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Returns all captured records, in emission order.
    #[must_use]
    pub fn records(&self) -> Vec<CapturedLog> {
        self.records.lock().clone()
    }

    /// Returns the number of records captured at `level`.
    #[must_use]
    pub fn count_at(&self, level: Level) -> usize {
        self.records.lock().iter().filter(|r| r.level == level).count()
    }

    /// Returns the number of captured records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Discards captured records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

struct CaptureLayer {
    records: Arc<Mutex<Vec<CapturedLog>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(CRATE_TARGET) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.records.lock().push(CapturedLog {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.insert(field.name().to_string(), format!("{value:?}"));
        }
    }
}
