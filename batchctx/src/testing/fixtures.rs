//! Sample execution contexts and payloads.

use crate::context::{ExecutionContext, JobParameter, JobParameters};
use crate::utils::from_epoch_millis;

/// Key under which [`legacy_payload`] stores its job parameters.
pub const LEGACY_JOB_PARAMETERS_KEY: &str = "jobParameters";

/// A context as written by the older framework release.
///
/// It carries no type identifiers, so the typed strategy rejects it.
#[must_use]
pub fn legacy_payload() -> &'static str {
    r#"{
        "batch.taskletType": "org.springframework.batch.core.step.item.ChunkOrientedTasklet",
        "read.count": 250,
        "commit.interval": 10,
        "skip.ratio": 0.02,
        "jobParameters": {
            "parameters": {
                "input.file": {"identifying": true, "type": "STRING", "value": "/data/orders.csv"},
                "run.date": {"identifying": true, "type": "DATE", "value": ["java.util.Date", 1700000000000]},
                "run.id": {"identifying": true, "type": "LONG", "value": ["java.lang.Long", 42]},
                "threshold": {"identifying": false, "type": "DOUBLE", "value": 0.75}
            }
        }
    }"#
}

/// A context as written by the current framework release.
#[must_use]
pub fn typed_payload() -> &'static str {
    r#"{
        "@class": "java.util.HashMap",
        "batch.taskletType": "org.springframework.batch.core.step.item.ChunkOrientedTasklet",
        "read.count": ["java.lang.Long", 250],
        "last.run": ["java.util.Date", 1700000000000],
        "partitions": ["java.util.ArrayList", ["east", "west"]]
    }"#
}

/// The context [`legacy_payload`] decodes to.
#[must_use]
pub fn sample_context() -> ExecutionContext {
    let run_date = from_epoch_millis(1_700_000_000_000).unwrap_or_default();
    let parameters = JobParameters::new()
        .with_parameter("input.file", JobParameter::string("/data/orders.csv", true))
        .with_parameter("run.date", JobParameter::date(run_date, true))
        .with_parameter("run.id", JobParameter::long(42, true))
        .with_parameter("threshold", JobParameter::double(0.75, false));

    ExecutionContext::new()
        .with_entry(
            "batch.taskletType",
            "org.springframework.batch.core.step.item.ChunkOrientedTasklet",
        )
        .with_entry("read.count", 250_i64)
        .with_entry("commit.interval", 10_i64)
        .with_entry("skip.ratio", 0.02)
        .with_entry(LEGACY_JOB_PARAMETERS_KEY, parameters)
}
