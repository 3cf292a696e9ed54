//! Decoding extension for job parameters.
//!
//! A job parameter travels as an object with three members:
//!
//! ```json
//! {"identifying": true, "type": "LONG", "value": ["java.lang.Long", 42]}
//! ```
//!
//! `DATE` and `LONG` nest their payload in a `[type-id, value]` pair while
//! `STRING` and `DOUBLE` carry it directly. Old databases are full of this
//! shape, so it is read and written exactly as is.

use super::{encode_double, index_path, key_path, type_ids};
use crate::context::{JobParameter, JobParameters, ParameterType, ParameterValue};
use crate::errors::{DecodeError, DecodeErrorKind, Result};
use crate::utils::{from_epoch_millis, to_epoch_millis};
use serde_json::{json, Map, Value};

/// Member holding the identity flag.
pub const IDENTIFYING_KEY: &str = "identifying";
/// Member holding the type tag.
pub const TYPE_KEY: &str = "type";
/// Member holding the payload.
pub const VALUE_KEY: &str = "value";
/// Member of a job parameters object holding the named parameters.
pub const PARAMETERS_KEY: &str = "parameters";
/// Computed member of a job parameters object; never written, ignored on read.
pub const EMPTY_KEY: &str = "empty";

/// Custom codec for [`JobParameter`] and [`JobParameters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobParametersModule;

impl JobParametersModule {
    /// Module name, as reported in diagnostics.
    pub const NAME: &'static str = "Job parameters module";

    /// Creates the module.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Whether an object has the members of a job parameter.
    #[must_use]
    pub fn is_parameter_node(map: &Map<String, Value>) -> bool {
        map.contains_key(IDENTIFYING_KEY) && map.contains_key(TYPE_KEY) && map.contains_key(VALUE_KEY)
    }

    /// Whether an object has the shape of a job parameters collection.
    ///
    /// Besides `parameters`, only the computed `empty` member may be present.
    #[must_use]
    pub fn is_parameters_node(map: &Map<String, Value>) -> bool {
        let Some(Value::Object(parameters)) = map.get(PARAMETERS_KEY) else {
            return false;
        };
        map.keys().all(|k| k == PARAMETERS_KEY || k == EMPTY_KEY)
            && parameters
                .values()
                .all(|p| p.as_object().is_some_and(Self::is_parameter_node))
    }

    /// Decodes one job parameter node.
    ///
    /// Members other than the three named ones are not inspected.
    pub fn decode_parameter(&self, node: &Value, path: &str) -> std::result::Result<JobParameter, DecodeError> {
        let Value::Object(map) = node else {
            return Err(DecodeError::new(
                DecodeErrorKind::InvalidValue,
                "expected a job parameter object",
            )
            .at(path));
        };

        let identifying = required(map, IDENTIFYING_KEY, path)?
            .as_bool()
            .ok_or_else(|| invalid(path, IDENTIFYING_KEY, "expected a boolean"))?;

        let tag = required(map, TYPE_KEY, path)?
            .as_str()
            .ok_or_else(|| invalid(path, TYPE_KEY, "expected a string"))?;
        let parameter_type = tag
            .parse::<ParameterType>()
            .map_err(|e| DecodeError::from(e).at(key_path(path, TYPE_KEY)))?;

        let value = required(map, VALUE_KEY, path)?;
        let value_path = key_path(path, VALUE_KEY);

        let parameter_value = match parameter_type {
            ParameterType::String => {
                let text = value
                    .as_str()
                    .ok_or_else(|| invalid(path, VALUE_KEY, "expected a string"))?;
                ParameterValue::String(text.to_string())
            }
            ParameterType::Date => {
                let millis = wrapped_long(value, &value_path)?;
                let date = from_epoch_millis(millis).map_err(|e| {
                    DecodeError::new(DecodeErrorKind::InvalidTimestamp, e.to_string())
                        .at(index_path(&value_path, 1))
                })?;
                ParameterValue::Date(date)
            }
            ParameterType::Long => ParameterValue::Long(wrapped_long(value, &value_path)?),
            ParameterType::Double => {
                let number = value
                    .as_f64()
                    .ok_or_else(|| invalid(path, VALUE_KEY, "expected a number"))?;
                ParameterValue::Double(number)
            }
        };

        Ok(JobParameter::new(parameter_value, identifying))
    }

    /// Decodes the `parameters` member of a job parameters node.
    pub fn decode_parameters(
        &self,
        node: &Map<String, Value>,
        path: &str,
    ) -> std::result::Result<JobParameters, DecodeError> {
        let parameters_path = key_path(path, PARAMETERS_KEY);
        let Value::Object(parameters) = required(node, PARAMETERS_KEY, path)? else {
            return Err(invalid(path, PARAMETERS_KEY, "expected an object"));
        };

        parameters
            .iter()
            .filter(|(name, _)| name.as_str() != type_ids::CLASS_PROPERTY)
            .map(|(name, p)| {
                self.decode_parameter(p, &key_path(&parameters_path, name))
                    .map(|p| (name.clone(), p))
            })
            .collect()
    }

    /// Encodes a job parameter in its tagged form.
    pub fn encode_parameter(&self, parameter: &JobParameter, path: &str) -> Result<Value> {
        let value = match parameter.value() {
            ParameterValue::String(s) => Value::String(s.clone()),
            ParameterValue::Date(d) => json!([type_ids::DATE, to_epoch_millis(d)]),
            ParameterValue::Long(n) => json!([type_ids::LONG, n]),
            ParameterValue::Double(n) => encode_double(*n, &key_path(path, VALUE_KEY))?,
        };

        let mut map = Map::new();
        map.insert(IDENTIFYING_KEY.to_string(), Value::Bool(parameter.is_identifying()));
        map.insert(
            TYPE_KEY.to_string(),
            Value::String(parameter.parameter_type().as_str().to_string()),
        );
        map.insert(VALUE_KEY.to_string(), value);
        Ok(Value::Object(map))
    }

    /// Encodes the named parameters of a collection, without the computed `empty`.
    pub fn encode_parameters(&self, parameters: &JobParameters, path: &str) -> Result<Map<String, Value>> {
        let parameters_path = key_path(path, PARAMETERS_KEY);
        parameters
            .iter()
            .map(|(name, p)| {
                self.encode_parameter(p, &key_path(&parameters_path, name))
                    .map(|v| (name.clone(), v))
            })
            .collect()
    }
}

fn required<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> std::result::Result<&'a Value, DecodeError> {
    map.get(key).ok_or_else(|| {
        DecodeError::new(DecodeErrorKind::MissingField, format!("'{key}' is required")).at(path)
    })
}

fn invalid(path: &str, key: &str, message: &str) -> DecodeError {
    DecodeError::new(DecodeErrorKind::InvalidValue, message).at(key_path(path, key))
}

/// Reads the integer at index 1 of a `[type-id, value]` pair.
fn wrapped_long(value: &Value, path: &str) -> std::result::Result<i64, DecodeError> {
    value.get(1).and_then(Value::as_i64).ok_or_else(|| {
        DecodeError::new(
            DecodeErrorKind::InvalidValue,
            "expected a [type-id, integer] pair",
        )
        .at(path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(node: Value) -> std::result::Result<JobParameter, DecodeError> {
        JobParametersModule::new().decode_parameter(&node, "$.p")
    }

    #[test]
    fn test_decode_string_parameter() {
        let param = decode(json!({"identifying": true, "type": "STRING", "value": "abc"})).unwrap();
        assert!(param.is_identifying());
        assert_eq!(param.value(), &ParameterValue::String("abc".to_string()));
    }

    #[test]
    fn test_decode_date_parameter() {
        let param = decode(json!({
            "identifying": false,
            "type": "DATE",
            "value": ["java.util.Date", 1_700_000_000_000_i64]
        }))
        .unwrap();
        assert!(!param.is_identifying());
        assert_eq!(param.parameter_type(), ParameterType::Date);
        assert_eq!(
            param.value(),
            &ParameterValue::Date(from_epoch_millis(1_700_000_000_000).unwrap())
        );
    }

    #[test]
    fn test_decode_long_parameter_reads_index_one() {
        let param = decode(json!({
            "identifying": true,
            "type": "LONG",
            "value": ["java.lang.Long", 9_007_199_254_740_993_i64]
        }))
        .unwrap();
        assert_eq!(param.value(), &ParameterValue::Long(9_007_199_254_740_993));
    }

    #[test]
    fn test_decode_double_parameter_is_direct() {
        let param = decode(json!({"identifying": false, "type": "DOUBLE", "value": 2.5})).unwrap();
        assert_eq!(param.value(), &ParameterValue::Double(2.5));

        let param = decode(json!({"identifying": false, "type": "DOUBLE", "value": 3})).unwrap();
        assert_eq!(param.value(), &ParameterValue::Double(3.0));
    }

    #[test]
    fn test_decode_unrecognized_tag() {
        let err = decode(json!({"identifying": true, "type": "BOOLEAN", "value": true})).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnrecognizedTag);
        assert_eq!(err.path, "$.p.type");
    }

    #[test]
    fn test_decode_missing_member() {
        let err = decode(json!({"identifying": true, "value": "abc"})).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MissingField);
        assert!(err.message.contains("'type'"));
    }

    #[test]
    fn test_decode_long_without_wrapper_fails() {
        let err = decode(json!({"identifying": true, "type": "LONG", "value": 5})).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidValue);
        assert_eq!(err.path, "$.p.value");
    }

    #[test]
    fn test_decode_date_out_of_range() {
        let err = decode(json!({
            "identifying": true,
            "type": "DATE",
            "value": ["java.util.Date", i64::MAX]
        }))
        .unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidTimestamp);
        assert_eq!(err.path, "$.p.value[1]");
    }

    #[test]
    fn test_decode_non_boolean_identifying() {
        let err = decode(json!({"identifying": "yes", "type": "STRING", "value": "x"})).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidValue);
        assert_eq!(err.path, "$.p.identifying");
    }

    #[test]
    fn test_encode_preserves_wire_asymmetry() {
        let module = JobParametersModule::new();
        let date = from_epoch_millis(1_700_000_000_000).unwrap();

        assert_eq!(
            module.encode_parameter(&JobParameter::date(date, true), "$").unwrap(),
            json!({"identifying": true, "type": "DATE", "value": ["java.util.Date", 1_700_000_000_000_i64]})
        );
        assert_eq!(
            module.encode_parameter(&JobParameter::long(4, false), "$").unwrap(),
            json!({"identifying": false, "type": "LONG", "value": ["java.lang.Long", 4]})
        );
        assert_eq!(
            module.encode_parameter(&JobParameter::string("s", true), "$").unwrap(),
            json!({"identifying": true, "type": "STRING", "value": "s"})
        );
        assert_eq!(
            module.encode_parameter(&JobParameter::double(0.5, true), "$").unwrap(),
            json!({"identifying": true, "type": "DOUBLE", "value": 0.5})
        );
    }

    #[test]
    fn test_encode_rejects_non_finite_double() {
        let module = JobParametersModule::new();
        assert!(module
            .encode_parameter(&JobParameter::double(f64::NAN, true), "$")
            .is_err());
    }

    #[test]
    fn test_parameters_node_detection() {
        let node = json!({
            "parameters": {"a": {"identifying": true, "type": "STRING", "value": "x"}},
            "empty": false
        });
        assert!(JobParametersModule::is_parameters_node(node.as_object().unwrap()));

        let node = json!({"parameters": {"a": 1}});
        assert!(!JobParametersModule::is_parameters_node(node.as_object().unwrap()));

        let node = json!({"parameters": {}, "other": 1});
        assert!(!JobParametersModule::is_parameters_node(node.as_object().unwrap()));
    }

    #[test]
    fn test_decode_parameters_collection() {
        let node = json!({
            "parameters": {
                "run.id": {"identifying": true, "type": "LONG", "value": ["java.lang.Long", 3]},
                "file": {"identifying": false, "type": "STRING", "value": "in.csv"}
            }
        });
        let params = JobParametersModule::new()
            .decode_parameters(node.as_object().unwrap(), "$.jp")
            .unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get_long("run.id"), Some(3));
        assert_eq!(params.get_string("file"), Some("in.csv"));
    }
}
