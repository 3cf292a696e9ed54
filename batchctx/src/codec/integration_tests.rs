//! End-to-end tests for the backwards-compatible serializer.

#[cfg(test)]
mod tests {
    use crate::codec::{
        BackwardsCompatibleSerializer, ContextStrategy, LegacyJsonStrategy, TypedJsonStrategy,
    };
    use crate::context::{ContextValue, ExecutionContext, ParameterValue};
    use crate::errors::{CodecError, DecodeErrorKind};
    use crate::testing::{
        assert_context_has_key, assert_decode_kind, assert_job_parameter, legacy_payload,
        sample_context, typed_payload, LogCapture, LEGACY_JOB_PARAMETERS_KEY,
    };
    use crate::utils::from_epoch_millis;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::{Cursor, Seek, SeekFrom};
    use std::sync::Arc;
    use tracing::Level;

    fn decode_parameter_document(parameter: &serde_json::Value) -> Result<ExecutionContext, CodecError> {
        let document = json!({ "param": parameter }).to_string();
        BackwardsCompatibleSerializer::new().deserialize_str(&document)
    }

    #[test]
    fn test_round_trip_of_plain_json_values() {
        let serializer = BackwardsCompatibleSerializer::new();
        let serde_json::Value::Object(map) = json!({
            "step": "load-orders",
            "count": 1024,
            "ratio": 0.125,
            "flags": [true, false, null],
            "nested": {"depth": 2, "names": ["a", "b"]},
            "nothing": null
        }) else {
            unreachable!()
        };
        let original = ExecutionContext::from_json_map(map);

        let mut sink = Vec::new();
        serializer.serialize(Some(&original), Some(&mut sink)).unwrap();
        let decoded = serializer.deserialize(Some(&mut Cursor::new(sink))).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_map_shaped_like_a_parameter_is_read_as_one() {
        let serializer = BackwardsCompatibleSerializer::new();
        let serde_json::Value::Object(map) = json!({
            "reader": {"identifying": true, "type": "csv", "value": 1}
        }) else {
            unreachable!()
        };
        let original = ExecutionContext::from_json_map(map);

        let json = serializer.serialize_to_string(&original).unwrap();
        let err = serializer.deserialize_str(&json).unwrap_err();

        match err {
            CodecError::Decode { strategy, source } => {
                assert_eq!(strategy, LegacyJsonStrategy::NAME);
                assert_eq!(source.kind, DecodeErrorKind::UnrecognizedTag);
                assert_eq!(source.path, "$.reader.type");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_map_shaped_like_parameters_is_read_as_job_parameters() {
        let serializer = BackwardsCompatibleSerializer::new();
        let serde_json::Value::Object(map) = json!({"cfg": {"parameters": {}}}) else {
            unreachable!()
        };
        let original = ExecutionContext::from_json_map(map);
        assert!(matches!(original.get("cfg"), Some(ContextValue::Map(_))));

        let decoded = serializer
            .deserialize_str(&serializer.serialize_to_string(&original).unwrap())
            .unwrap();

        let params = decoded.get_job_parameters("cfg").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_round_trip_of_job_parameters() {
        let serializer = BackwardsCompatibleSerializer::new();
        let original = sample_context();

        let json = serializer.serialize_to_string(&original).unwrap();
        assert!(!json.contains("\"empty\""));
        assert!(!json.contains("@class"));

        assert_eq!(serializer.deserialize_str(&json).unwrap(), original);
    }

    #[test]
    fn test_round_trip_normalizes_dates_outside_parameters() {
        let serializer = BackwardsCompatibleSerializer::new();
        let date = from_epoch_millis(1_700_000_000_000).unwrap();
        let original = ExecutionContext::new().with_entry("when", date);

        let decoded = serializer
            .deserialize_str(&serializer.serialize_to_string(&original).unwrap())
            .unwrap();
        assert_eq!(decoded.get_long("when"), Some(1_700_000_000_000));
    }

    #[test]
    fn test_legacy_payload_decodes_through_fallback() {
        let serializer = BackwardsCompatibleSerializer::new();
        let capture = LogCapture::new();

        let ctx = capture
            .capture(|| serializer.deserialize(Some(&mut legacy_payload().as_bytes())))
            .unwrap();

        assert_eq!(ctx, sample_context());
        assert_eq!(capture.count_at(Level::INFO), 1);
        assert_eq!(capture.count_at(Level::DEBUG), 1);
    }

    #[test]
    fn test_typed_payload_decodes_without_fallback() {
        let serializer = BackwardsCompatibleSerializer::new();
        let capture = LogCapture::new();

        let ctx = capture
            .capture(|| serializer.deserialize_str(typed_payload()))
            .unwrap();

        assert!(capture.is_empty());
        assert_context_has_key(&ctx, "batch.taskletType");
        assert_eq!(ctx.get_long("read.count"), Some(250));
        assert_eq!(ctx.get_date("last.run"), Some(from_epoch_millis(1_700_000_000_000).unwrap()));
        assert_eq!(
            ctx.get("partitions"),
            Some(&ContextValue::List(vec!["east".into(), "west".into()]))
        );
    }

    #[test]
    fn test_current_format_written_by_typed_strategy_is_read_directly() {
        let serializer = BackwardsCompatibleSerializer::new();
        let mut buf = Vec::new();
        TypedJsonStrategy::default()
            .encode(&sample_context(), &mut buf)
            .unwrap();

        let capture = LogCapture::new();
        let ctx = capture
            .capture(|| serializer.deserialize(Some(&mut buf.as_slice())))
            .unwrap();

        assert_eq!(ctx, sample_context());
        assert!(capture.is_empty());
    }

    #[test]
    fn test_malformed_payload_fails_both_strategies() {
        let serializer = BackwardsCompatibleSerializer::new();
        let capture = LogCapture::new();

        let result = capture.capture(|| serializer.deserialize_str(r#"{"count": 1,"#));

        assert_decode_kind(&result, DecodeErrorKind::Malformed);
        assert!(matches!(
            result,
            Err(CodecError::Decode { strategy: LegacyJsonStrategy::NAME, .. })
        ));
        assert_eq!(capture.count_at(Level::INFO), 1);
    }

    #[test]
    fn test_job_parameter_string() {
        let ctx = decode_parameter_document(&json!({"identifying": true, "type": "STRING", "value": "abc"})).unwrap();
        let param = ctx.get("param").and_then(ContextValue::as_job_parameter).unwrap();
        assert!(param.is_identifying());
        assert_eq!(param.value(), &ParameterValue::String("abc".to_string()));
    }

    #[test]
    fn test_job_parameter_date() {
        let ctx = decode_parameter_document(&json!({
            "identifying": false,
            "type": "DATE",
            "value": ["java.util.Date", 1_700_000_000_000_i64]
        }))
        .unwrap();
        let param = ctx.get("param").and_then(ContextValue::as_job_parameter).unwrap();
        assert!(!param.is_identifying());
        assert_eq!(
            param.value(),
            &ParameterValue::Date(from_epoch_millis(1_700_000_000_000).unwrap())
        );
    }

    #[test]
    fn test_job_parameter_long_and_double() {
        let ctx = decode_parameter_document(&json!({
            "identifying": true,
            "type": "LONG",
            "value": ["java.lang.Long", -15]
        }))
        .unwrap();
        assert_eq!(
            ctx.get("param").and_then(ContextValue::as_job_parameter).map(|p| p.value()),
            Some(&ParameterValue::Long(-15))
        );

        let ctx = decode_parameter_document(&json!({
            "identifying": false,
            "type": "DOUBLE",
            "value": 3.75
        }))
        .unwrap();
        assert_eq!(
            ctx.get("param").and_then(ContextValue::as_job_parameter).map(|p| p.value()),
            Some(&ParameterValue::Double(3.75))
        );
    }

    #[test]
    fn test_job_parameters_from_fixture() {
        let ctx = BackwardsCompatibleSerializer::new()
            .deserialize_str(legacy_payload())
            .unwrap();

        assert_job_parameter(
            &ctx,
            LEGACY_JOB_PARAMETERS_KEY,
            "input.file",
            &ParameterValue::String("/data/orders.csv".to_string()),
        );
        assert_job_parameter(&ctx, LEGACY_JOB_PARAMETERS_KEY, "run.id", &ParameterValue::Long(42));
        assert_job_parameter(
            &ctx,
            LEGACY_JOB_PARAMETERS_KEY,
            "threshold",
            &ParameterValue::Double(0.75),
        );
    }

    #[test]
    fn test_unrecognized_tag_is_an_error() {
        let result = decode_parameter_document(&json!({
            "identifying": true,
            "type": "BOOLEAN",
            "value": true
        }));
        assert_decode_kind(&result, DecodeErrorKind::UnrecognizedTag);
    }

    #[test]
    fn test_file_backed_sink_and_source() {
        let serializer = BackwardsCompatibleSerializer::new();
        let mut file = tempfile::tempfile().unwrap();

        serializer
            .serialize(Some(&sample_context()), Some(&mut file))
            .unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let decoded = serializer.deserialize(Some(&mut file)).unwrap();

        assert_eq!(decoded, sample_context());
    }

    #[test]
    fn test_serializer_is_shared_across_threads() {
        let serializer = Arc::new(BackwardsCompatibleSerializer::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let serializer = Arc::clone(&serializer);
                std::thread::spawn(move || {
                    let legacy = serializer.deserialize_str(legacy_payload()).unwrap();
                    let typed = serializer.deserialize_str(typed_payload()).unwrap();
                    (legacy, typed.len())
                })
            })
            .collect();

        for handle in handles {
            let (legacy, typed_len) = handle.join().unwrap();
            assert_eq!(legacy, sample_context());
            assert_eq!(typed_len, 4);
        }
    }
}
