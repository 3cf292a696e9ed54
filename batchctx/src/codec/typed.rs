//! The current, type-identified JSON format.
//!
//! Objects carry their type in an `@class` member; scalars that JSON cannot
//! tell apart (longs, dates) and lists are wrapped as `[type-id, payload]`.
//! Strings, booleans, null and doubles are written as is.

use super::job_parameters_module::{JobParametersModule, PARAMETERS_KEY};
use super::type_ids::{self, TypeShape, CLASS_PROPERTY};
use super::{encode_double, index_path, key_path, ContextStrategy};
use crate::context::{ContextValue, ExecutionContext, JobParameter, JobParameters};
use crate::errors::{CodecError, DecodeError, DecodeErrorKind, Result};
use crate::utils::{from_epoch_millis, to_epoch_millis};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::io::Write;

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Configuration for the typed strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedJsonConfig {
    /// Type identifiers accepted in addition to the built-in ones.
    ///
    /// Objects tagged with one of these decode as maps, wrapped arrays as lists.
    #[serde(default)]
    pub trusted_type_ids: HashSet<String>,
}

impl TypedJsonConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trusts an additional type identifier.
    #[must_use]
    pub fn with_trusted_type_id(mut self, type_id: impl Into<String>) -> Self {
        self.trusted_type_ids.insert(type_id.into());
        self
    }
}

/// Strategy for the format written by the current framework release.
#[derive(Debug, Clone, Default)]
pub struct TypedJsonStrategy {
    config: TypedJsonConfig,
    module: JobParametersModule,
}

impl TypedJsonStrategy {
    /// Strategy name used in logs and errors.
    pub const NAME: &'static str = "typed";

    /// Creates a strategy with the given configuration.
    #[must_use]
    pub fn new(config: TypedJsonConfig) -> Self {
        Self {
            config,
            module: JobParametersModule::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &TypedJsonConfig {
        &self.config
    }

    /// Encodes a context into its typed JSON document.
    pub fn to_value(&self, context: &ExecutionContext) -> Result<Value> {
        let mut map = Map::new();
        map.insert(CLASS_PROPERTY.to_string(), Value::String(type_ids::HASH_MAP.to_string()));
        for (key, value) in context.iter() {
            reject_reserved(key, "$")?;
            map.insert(key.clone(), self.encode_value(value, &key_path("$", key))?);
        }
        Ok(Value::Object(map))
    }

    fn encode_value(&self, value: &ContextValue, path: &str) -> Result<Value> {
        let encoded = match value {
            ContextValue::Null => Value::Null,
            ContextValue::Bool(b) => Value::Bool(*b),
            ContextValue::String(s) => Value::String(s.clone()),
            ContextValue::Double(n) => encode_double(*n, path)?,
            ContextValue::Long(n) => json!([type_ids::LONG, n]),
            ContextValue::Date(d) => json!([type_ids::DATE, to_epoch_millis(d)]),
            ContextValue::List(items) => {
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.encode_value(item, &index_path(path, i)))
                    .collect::<Result<Vec<_>>>()?;
                json!([type_ids::ARRAY_LIST, items])
            }
            ContextValue::Map(entries) => {
                let mut map = Map::new();
                map.insert(CLASS_PROPERTY.to_string(), Value::String(type_ids::HASH_MAP.to_string()));
                for (key, item) in entries {
                    reject_reserved(key, path)?;
                    map.insert(key.clone(), self.encode_value(item, &key_path(path, key))?);
                }
                Value::Object(map)
            }
            ContextValue::JobParameter(p) => self.encode_parameter(p, path)?,
            ContextValue::JobParameters(p) => self.encode_parameters(p, path)?,
        };
        Ok(encoded)
    }

    fn encode_parameter(&self, parameter: &JobParameter, path: &str) -> Result<Value> {
        let mut encoded = self.module.encode_parameter(parameter, path)?;
        if let Value::Object(map) = &mut encoded {
            map.insert(
                CLASS_PROPERTY.to_string(),
                Value::String(type_ids::JOB_PARAMETER.to_string()),
            );
        }
        Ok(encoded)
    }

    fn encode_parameters(&self, parameters: &JobParameters, path: &str) -> Result<Value> {
        let parameters_path = key_path(path, PARAMETERS_KEY);
        let mut inner = Map::new();
        inner.insert(
            CLASS_PROPERTY.to_string(),
            Value::String(type_ids::LINKED_HASH_MAP.to_string()),
        );
        for (name, parameter) in parameters.iter() {
            reject_reserved(name, &parameters_path)?;
            inner.insert(
                name.clone(),
                self.encode_parameter(parameter, &key_path(&parameters_path, name))?,
            );
        }

        let mut map = Map::new();
        map.insert(
            CLASS_PROPERTY.to_string(),
            Value::String(type_ids::JOB_PARAMETERS.to_string()),
        );
        map.insert(PARAMETERS_KEY.to_string(), Value::Object(inner));
        Ok(Value::Object(map))
    }

    /// Decodes a parsed typed document.
    pub fn from_value(&self, document: &Value) -> DecodeResult<ExecutionContext> {
        let Value::Object(root) = document else {
            return Err(DecodeError::new(
                DecodeErrorKind::InvalidValue,
                "expected a JSON object at the root",
            ));
        };

        let shape = self.object_shape(root, "$")?;
        if !matches!(shape, TypeShape::Map | TypeShape::Generic) {
            return Err(DecodeError::new(
                DecodeErrorKind::InvalidTypeId,
                "root type id does not name a map type",
            ));
        }

        Ok(ExecutionContext::from(self.decode_entries(root, "$")?))
    }

    fn resolve(&self, type_id: &str, path: &str) -> DecodeResult<TypeShape> {
        type_ids::builtin_shape(type_id)
            .or_else(|| {
                self.config
                    .trusted_type_ids
                    .contains(type_id)
                    .then_some(TypeShape::Generic)
            })
            .ok_or_else(|| {
                DecodeError::new(
                    DecodeErrorKind::UntrustedTypeId,
                    format!("the type id '{type_id}' is not trusted"),
                )
                .at(path)
            })
    }

    fn object_shape(&self, map: &Map<String, Value>, path: &str) -> DecodeResult<TypeShape> {
        let type_id = match map.get(CLASS_PROPERTY) {
            Some(Value::String(id)) => id,
            Some(_) => {
                return Err(DecodeError::new(
                    DecodeErrorKind::InvalidTypeId,
                    format!("'{CLASS_PROPERTY}' must be a string"),
                )
                .at(key_path(path, CLASS_PROPERTY)))
            }
            None => {
                return Err(DecodeError::new(
                    DecodeErrorKind::MissingTypeId,
                    format!("missing type id property '{CLASS_PROPERTY}'"),
                )
                .at(path))
            }
        };

        let shape = self.resolve(type_id, path)?;
        if shape.is_object() {
            Ok(shape)
        } else {
            Err(DecodeError::new(
                DecodeErrorKind::InvalidTypeId,
                format!("type id '{type_id}' cannot tag an object"),
            )
            .at(path))
        }
    }

    fn decode_entries(
        &self,
        map: &Map<String, Value>,
        path: &str,
    ) -> DecodeResult<HashMap<String, ContextValue>> {
        map.iter()
            .filter(|(key, _)| key.as_str() != CLASS_PROPERTY)
            .map(|(key, value)| {
                self.decode_value(value, &key_path(path, key))
                    .map(|v| (key.clone(), v))
            })
            .collect()
    }

    fn decode_value(&self, value: &Value, path: &str) -> DecodeResult<ContextValue> {
        match value {
            Value::Array(items) => self.decode_wrapped(items, path),
            Value::Object(map) => self.decode_object(map, path),
            scalar => Ok(ContextValue::from(scalar.clone())),
        }
    }

    fn decode_object(&self, map: &Map<String, Value>, path: &str) -> DecodeResult<ContextValue> {
        match self.object_shape(map, path)? {
            TypeShape::JobParameter => self
                .module
                .decode_parameter(&Value::Object(map.clone()), path)
                .map(ContextValue::JobParameter),
            TypeShape::JobParameters => self
                .decode_parameters(map, path)
                .map(ContextValue::JobParameters),
            _ => self.decode_entries(map, path).map(ContextValue::Map),
        }
    }

    fn decode_parameters(&self, map: &Map<String, Value>, path: &str) -> DecodeResult<JobParameters> {
        let parameters_path = key_path(path, PARAMETERS_KEY);
        let Some(Value::Object(parameters)) = map.get(PARAMETERS_KEY) else {
            return Err(DecodeError::new(
                DecodeErrorKind::MissingField,
                format!("'{PARAMETERS_KEY}' object is required"),
            )
            .at(path));
        };
        if self.object_shape(parameters, &parameters_path)? != TypeShape::Map {
            return Err(DecodeError::new(
                DecodeErrorKind::InvalidTypeId,
                "parameters must be tagged with a map type id",
            )
            .at(parameters_path));
        }

        parameters
            .iter()
            .filter(|(name, _)| name.as_str() != CLASS_PROPERTY)
            .map(|(name, node)| {
                let node_path = key_path(&parameters_path, name);
                match self.decode_value(node, &node_path)? {
                    ContextValue::JobParameter(p) => Ok((name.clone(), p)),
                    other => Err(DecodeError::new(
                        DecodeErrorKind::InvalidTypeId,
                        format!("expected a job parameter, found {}", other.type_name()),
                    )
                    .at(node_path)),
                }
            })
            .collect()
    }

    fn decode_wrapped(&self, items: &[Value], path: &str) -> DecodeResult<ContextValue> {
        let (type_id, payload) = match items {
            [Value::String(type_id), payload] => (type_id.as_str(), payload),
            _ => {
                return Err(DecodeError::new(
                    DecodeErrorKind::MissingTypeId,
                    "expected a [type-id, value] pair",
                )
                .at(path))
            }
        };
        let payload_path = index_path(path, 1);
        let mismatch = |expected: &str| {
            DecodeError::new(
                DecodeErrorKind::InvalidTypeId,
                format!("type id '{type_id}' expects {expected}"),
            )
            .at(payload_path.clone())
        };

        match self.resolve(type_id, path)? {
            TypeShape::Long => payload
                .as_i64()
                .map(ContextValue::Long)
                .ok_or_else(|| mismatch("an integer")),
            TypeShape::Double => payload
                .as_f64()
                .map(ContextValue::Double)
                .ok_or_else(|| mismatch("a number")),
            TypeShape::String => payload
                .as_str()
                .map(ContextValue::from)
                .ok_or_else(|| mismatch("a string")),
            TypeShape::Bool => payload
                .as_bool()
                .map(ContextValue::Bool)
                .ok_or_else(|| mismatch("a boolean")),
            TypeShape::Date => {
                let millis = payload.as_i64().ok_or_else(|| mismatch("epoch milliseconds"))?;
                from_epoch_millis(millis).map(ContextValue::Date).map_err(|e| {
                    DecodeError::new(DecodeErrorKind::InvalidTimestamp, e.to_string())
                        .at(payload_path.clone())
                })
            }
            TypeShape::List | TypeShape::Generic => {
                let Value::Array(elements) = payload else {
                    return Err(mismatch("an array"));
                };
                elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| self.decode_value(element, &index_path(&payload_path, i)))
                    .collect::<DecodeResult<Vec<_>>>()
                    .map(ContextValue::List)
            }
            TypeShape::Map | TypeShape::JobParameter | TypeShape::JobParameters => Err(
                DecodeError::new(
                    DecodeErrorKind::InvalidTypeId,
                    format!("type id '{type_id}' must be carried as an object"),
                )
                .at(path),
            ),
        }
    }
}

fn reject_reserved(key: &str, path: &str) -> Result<()> {
    if key == CLASS_PROPERTY {
        return Err(CodecError::Encode(format!(
            "key '{CLASS_PROPERTY}' is reserved at {path}"
        )));
    }
    Ok(())
}

impl ContextStrategy for TypedJsonStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn encode(&self, context: &ExecutionContext, sink: &mut dyn Write) -> Result<()> {
        let document = self.to_value(context)?;
        serde_json::to_writer(sink, &document)?;
        Ok(())
    }

    fn decode(&self, json: &str) -> DecodeResult<ExecutionContext> {
        let document: Value = serde_json::from_str(json).map_err(|e| DecodeError::malformed(&e))?;
        self.from_value(&document)
    }
}
