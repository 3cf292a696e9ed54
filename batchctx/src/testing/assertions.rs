//! Test assertions for decoded contexts.

use crate::context::{ExecutionContext, ParameterValue};
use crate::errors::{CodecError, DecodeErrorKind};

/// Asserts that the context contains a specific key.
pub fn assert_context_has_key(context: &ExecutionContext, key: &str) {
    assert!(
        context.contains_key(key),
        "Expected context to contain key '{}', but it doesn't. Keys: {:?}",
        key,
        context.keys().collect::<Vec<_>>()
    );
}

/// Asserts that a job parameter inside a job parameters entry has the expected value.
pub fn assert_job_parameter(
    context: &ExecutionContext,
    parameters_key: &str,
    name: &str,
    expected: &ParameterValue,
) {
    let parameters = context
        .get_job_parameters(parameters_key)
        .unwrap_or_else(|| panic!("Expected job parameters under '{parameters_key}'"));
    let parameter = parameters
        .get(name)
        .unwrap_or_else(|| panic!("Expected job parameter '{name}' under '{parameters_key}'"));
    assert_eq!(
        parameter.value(),
        expected,
        "Job parameter '{name}' has an unexpected value"
    );
}

/// Asserts that a result failed with a decode error of the given kind.
pub fn assert_decode_kind<T: std::fmt::Debug>(
    result: &Result<T, CodecError>,
    expected: DecodeErrorKind,
) {
    match result {
        Err(err) => assert_eq!(
            err.decode_kind(),
            Some(expected),
            "Expected decode error {expected:?}, got: {err}"
        ),
        Ok(value) => panic!("Expected decode error {expected:?}, got: {value:?}"),
    }
}
