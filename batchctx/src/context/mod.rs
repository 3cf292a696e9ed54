//! Execution context model.
//!
//! An [`ExecutionContext`] is the key-value state blob a batch job persists
//! between steps. Values are dynamically typed through [`ContextValue`].

mod job_parameters;


pub use job_parameters::{JobParameter, JobParameters, ParameterType, ParameterValue};

use crate::utils::Timestamp;
use std::collections::HashMap;

/// A dynamically typed execution context value.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    /// JSON null.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer, normalized to 64 bits.
    Long(i64),
    /// A floating point number.
    Double(f64),
    /// A string.
    String(String),
    /// A point in time.
    Date(Timestamp),
    /// An ordered sequence of values.
    List(Vec<ContextValue>),
    /// A nested string-keyed map.
    Map(HashMap<String, ContextValue>),
    /// A single job parameter.
    JobParameter(JobParameter),
    /// A collection of job parameters.
    JobParameters(JobParameters),
}

impl ContextValue {
    /// Returns a short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::JobParameter(_) => "job_parameter",
            Self::JobParameters(_) => "job_parameters",
        }
    }

    /// Returns true if this is `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string value, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if any.
    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float. Longs are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            Self::Long(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the boolean value, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the date value, if any.
    #[must_use]
    pub const fn as_date(&self) -> Option<Timestamp> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the list, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ContextValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested map, if any.
    #[must_use]
    pub const fn as_map(&self) -> Option<&HashMap<String, ContextValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the job parameter, if any.
    #[must_use]
    pub const fn as_job_parameter(&self) -> Option<&JobParameter> {
        match self {
            Self::JobParameter(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the job parameters, if any.
    #[must_use]
    pub const fn as_job_parameters(&self) -> Option<&JobParameters> {
        match self {
            Self::JobParameters(p) => Some(p),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ContextValue {
    /// Integers that fit in i64 become `Long`; every other number is `Double`.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Double(n.as_f64().unwrap_or(f64::NAN)), Self::Long),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        Self::Long(i64::from(value))
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Timestamp> for ContextValue {
    fn from(value: Timestamp) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<ContextValue>> for ContextValue {
    fn from(value: Vec<ContextValue>) -> Self {
        Self::List(value)
    }
}

impl From<HashMap<String, ContextValue>> for ContextValue {
    fn from(value: HashMap<String, ContextValue>) -> Self {
        Self::Map(value)
    }
}

impl From<JobParameter> for ContextValue {
    fn from(value: JobParameter) -> Self {
        Self::JobParameter(value)
    }
}

impl From<JobParameters> for ContextValue {
    fn from(value: JobParameters) -> Self {
        Self::JobParameters(value)
    }
}

/// A job's persisted key-value state.
///
/// Constructed by the caller before serialization and rebuilt fresh by every
/// deserialization. Key order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    entries: HashMap<String, ContextValue>,
}

impl ExecutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Builds a context from a plain JSON object.
    #[must_use]
    pub fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter()
            .map(|(k, v)| (k, ContextValue::from(v)))
            .collect()
    }

    /// Inserts an entry, returning the previous value under that key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes an entry.
    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.entries.remove(key)
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    /// Gets a string value.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ContextValue::as_str)
    }

    /// Gets an integer value.
    #[must_use]
    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ContextValue::as_long)
    }

    /// Gets a float value.
    #[must_use]
    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ContextValue::as_double)
    }

    /// Gets a boolean value.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ContextValue::as_bool)
    }

    /// Gets a date value.
    #[must_use]
    pub fn get_date(&self, key: &str) -> Option<Timestamp> {
        self.get(key).and_then(ContextValue::as_date)
    }

    /// Gets a job parameters value.
    #[must_use]
    pub fn get_job_parameters(&self, key: &str) -> Option<&JobParameters> {
        self.get(key).and_then(ContextValue::as_job_parameters)
    }

    /// Checks whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the context, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> HashMap<String, ContextValue> {
        self.entries
    }
}

impl From<HashMap<String, ContextValue>> for ExecutionContext {
    fn from(entries: HashMap<String, ContextValue>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, ContextValue)> for ExecutionContext {
    fn from_iter<I: IntoIterator<Item = (String, ContextValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ExecutionContext {
    type Item = (String, ContextValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, ContextValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
