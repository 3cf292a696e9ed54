//! The legacy, untyped JSON format.
//!
//! Payloads written by the older framework release carry no type
//! identifiers. Job parameters are recognized by their members and decoded
//! through the [`JobParametersModule`].

use super::job_parameters_module::{
    JobParametersModule, IDENTIFYING_KEY, PARAMETERS_KEY, TYPE_KEY, VALUE_KEY,
};
use super::{encode_double, index_path, key_path, ContextStrategy};
use crate::context::{ContextValue, ExecutionContext, JobParameters};
use crate::errors::{CodecError, DecodeError, DecodeErrorKind, Result};
use crate::utils::to_epoch_millis;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Write;

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Configuration for the legacy strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyJsonConfig {
    /// Whether a job parameter with members beyond the known three fails.
    #[serde(default = "default_fail_on_unknown_fields")]
    pub fail_on_unknown_fields: bool,
    /// Whether encoding an empty job parameters collection fails.
    #[serde(default)]
    pub fail_on_empty_values: bool,
    /// Whether the job parameters module is registered.
    #[serde(default = "default_job_parameters_module")]
    pub job_parameters_module: bool,
}

fn default_fail_on_unknown_fields() -> bool {
    true
}

fn default_job_parameters_module() -> bool {
    true
}

impl Default for LegacyJsonConfig {
    fn default() -> Self {
        Self {
            fail_on_unknown_fields: default_fail_on_unknown_fields(),
            fail_on_empty_values: false,
            job_parameters_module: default_job_parameters_module(),
        }
    }
}

impl LegacyJsonConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets unknown-field handling.
    #[must_use]
    pub const fn with_fail_on_unknown_fields(mut self, fail: bool) -> Self {
        self.fail_on_unknown_fields = fail;
        self
    }

    /// Sets empty-value handling.
    #[must_use]
    pub const fn with_fail_on_empty_values(mut self, fail: bool) -> Self {
        self.fail_on_empty_values = fail;
        self
    }

    /// Registers or removes the job parameters module.
    #[must_use]
    pub const fn with_job_parameters_module(mut self, enabled: bool) -> Self {
        self.job_parameters_module = enabled;
        self
    }
}

/// Strategy for payloads written by the older framework release.
#[derive(Debug, Clone)]
pub struct LegacyJsonStrategy {
    config: LegacyJsonConfig,
    module: Option<JobParametersModule>,
}

impl Default for LegacyJsonStrategy {
    fn default() -> Self {
        Self::new(LegacyJsonConfig::default())
    }
}

impl LegacyJsonStrategy {
    /// Strategy name used in logs and errors.
    pub const NAME: &'static str = "legacy";

    /// Creates a strategy with the given configuration.
    #[must_use]
    pub fn new(config: LegacyJsonConfig) -> Self {
        let module = config.job_parameters_module.then(JobParametersModule::new);
        Self { config, module }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &LegacyJsonConfig {
        &self.config
    }

    /// Encodes a context into its legacy JSON document.
    pub fn to_value(&self, context: &ExecutionContext) -> Result<Value> {
        let map = context
            .iter()
            .map(|(key, value)| {
                self.encode_value(value, &key_path("$", key))
                    .map(|v| (key.clone(), v))
            })
            .collect::<Result<Map<_, _>>>()?;
        Ok(Value::Object(map))
    }

    fn encode_value(&self, value: &ContextValue, path: &str) -> Result<Value> {
        // Job parameters are always written in the tagged form, even when the
        // module is not registered for decoding.
        let module = self.module.unwrap_or_default();
        let encoded = match value {
            ContextValue::Null => Value::Null,
            ContextValue::Bool(b) => Value::Bool(*b),
            ContextValue::Long(n) => Value::from(*n),
            ContextValue::Double(n) => encode_double(*n, path)?,
            ContextValue::String(s) => Value::String(s.clone()),
            ContextValue::Date(d) => Value::from(to_epoch_millis(d)),
            ContextValue::List(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.encode_value(item, &index_path(path, i)))
                    .collect::<Result<Vec<_>>>()?,
            ),
            ContextValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, item)| {
                        self.encode_value(item, &key_path(path, key))
                            .map(|v| (key.clone(), v))
                    })
                    .collect::<Result<Map<_, _>>>()?,
            ),
            ContextValue::JobParameter(p) => module.encode_parameter(p, path)?,
            ContextValue::JobParameters(p) => self.encode_parameters(&module, p, path)?,
        };
        Ok(encoded)
    }

    fn encode_parameters(
        &self,
        module: &JobParametersModule,
        parameters: &JobParameters,
        path: &str,
    ) -> Result<Value> {
        if parameters.is_empty() && self.config.fail_on_empty_values {
            return Err(CodecError::Encode(format!(
                "no parameters to serialize for empty job parameters at {path}"
            )));
        }
        let mut map = Map::new();
        map.insert(
            PARAMETERS_KEY.to_string(),
            Value::Object(module.encode_parameters(parameters, path)?),
        );
        Ok(Value::Object(map))
    }

    /// Decodes a parsed legacy document.
    pub fn from_value(&self, document: &Value) -> DecodeResult<ExecutionContext> {
        let Value::Object(root) = document else {
            return Err(DecodeError::new(
                DecodeErrorKind::InvalidValue,
                "expected a JSON object at the root",
            ));
        };

        root.iter()
            .map(|(key, value)| {
                self.decode_value(value, &key_path("$", key))
                    .map(|v| (key.clone(), v))
            })
            .collect()
    }

    fn decode_value(&self, value: &Value, path: &str) -> DecodeResult<ContextValue> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.decode_value(item, &index_path(path, i)))
                .collect::<DecodeResult<Vec<_>>>()
                .map(ContextValue::List),
            Value::Object(map) => self.decode_object(map, path),
            scalar => Ok(ContextValue::from(scalar.clone())),
        }
    }

    fn decode_object(&self, map: &Map<String, Value>, path: &str) -> DecodeResult<ContextValue> {
        if let Some(module) = &self.module {
            if JobParametersModule::is_parameter_node(map) {
                self.check_parameter_members(map, path)?;
                return module
                    .decode_parameter(&Value::Object(map.clone()), path)
                    .map(ContextValue::JobParameter);
            }
            if JobParametersModule::is_parameters_node(map) {
                let parameters_path = key_path(path, PARAMETERS_KEY);
                if let Some(Value::Object(parameters)) = map.get(PARAMETERS_KEY) {
                    for (name, node) in parameters {
                        if let Value::Object(node) = node {
                            self.check_parameter_members(node, &key_path(&parameters_path, name))?;
                        }
                    }
                }
                return module
                    .decode_parameters(map, path)
                    .map(ContextValue::JobParameters);
            }
        }

        map.iter()
            .map(|(key, value)| {
                self.decode_value(value, &key_path(path, key))
                    .map(|v| (key.clone(), v))
            })
            .collect::<DecodeResult<HashMap<_, _>>>()
            .map(ContextValue::Map)
    }

    fn check_parameter_members(&self, map: &Map<String, Value>, path: &str) -> DecodeResult<()> {
        if !self.config.fail_on_unknown_fields {
            return Ok(());
        }
        match map
            .keys()
            .find(|k| ![IDENTIFYING_KEY, TYPE_KEY, VALUE_KEY].contains(&k.as_str()))
        {
            Some(unknown) => Err(DecodeError::new(
                DecodeErrorKind::UnknownField,
                format!("unrecognized field '{unknown}' on job parameter"),
            )
            .at(key_path(path, unknown))),
            None => Ok(()),
        }
    }
}

impl ContextStrategy for LegacyJsonStrategy {
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
