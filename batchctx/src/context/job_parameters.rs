//! Typed job parameters as stored inside execution contexts.

use crate::errors::UnrecognizedTagError;
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The type tag of a job parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterType {
    /// A text value.
    String,
    /// A date, carried as epoch milliseconds.
    Date,
    /// A 64-bit integer.
    Long,
    /// A 64-bit float.
    Double,
}

impl ParameterType {
    /// All known tags, in declaration order.
    pub const ALL: [Self; 4] = [Self::String, Self::Date, Self::Long, Self::Double];

    /// Returns the wire tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Date => "DATE",
            Self::Long => "LONG",
            Self::Double => "DOUBLE",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = UnrecognizedTagError;

    /// Tags are matched exactly; `"string"` is not `STRING`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnrecognizedTagError::new(s))
    }
}

/// The payload of a job parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// A text value.
    String(String),
    /// A point in time.
    Date(Timestamp),
    /// A 64-bit integer.
    Long(i64),
    /// A 64-bit float.
    Double(f64),
}

impl ParameterValue {
    /// Returns the tag matching this payload.
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        match self {
            Self::String(_) => ParameterType::String,
            Self::Date(_) => ParameterType::Date,
            Self::Long(_) => ParameterType::Long,
            Self::Double(_) => ParameterType::Double,
        }
    }
}

/// A typed input value to a batch job run.
///
/// The tag is derived from the payload, so a parameter can never carry a
/// value that disagrees with its type.
#[derive(Debug, Clone, PartialEq)]
pub struct JobParameter {
    value: ParameterValue,
    identifying: bool,
}

impl JobParameter {
    /// Creates a new job parameter.
    #[must_use]
    pub const fn new(value: ParameterValue, identifying: bool) -> Self {
        Self { value, identifying }
    }

    /// Creates a string parameter.
    #[must_use]
    pub fn string(value: impl Into<String>, identifying: bool) -> Self {
        Self::new(ParameterValue::String(value.into()), identifying)
    }

    /// Creates a date parameter.
    #[must_use]
    pub const fn date(value: Timestamp, identifying: bool) -> Self {
        Self::new(ParameterValue::Date(value), identifying)
    }

    /// Creates a long parameter.
    #[must_use]
    pub const fn long(value: i64, identifying: bool) -> Self {
        Self::new(ParameterValue::Long(value), identifying)
    }

    /// Creates a double parameter.
    #[must_use]
    pub const fn double(value: f64, identifying: bool) -> Self {
        Self::new(ParameterValue::Double(value), identifying)
    }

    /// Returns the payload.
    #[must_use]
    pub const fn value(&self) -> &ParameterValue {
        &self.value
    }

    /// Returns the type tag.
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        self.value.parameter_type()
    }

    /// Whether the parameter participates in job instance identity.
    #[must_use]
    pub const fn is_identifying(&self) -> bool {
        self.identifying
    }
}

impl fmt::Display for JobParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ParameterValue::String(s) => f.write_str(s),
            ParameterValue::Date(d) => write!(f, "{}", d.timestamp_millis()),
            ParameterValue::Long(n) => write!(f, "{n}"),
            ParameterValue::Double(n) => write!(f, "{n}"),
        }
    }
}

/// A named collection of job parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobParameters {
    parameters: BTreeMap<String, JobParameter>,
}

impl JobParameters {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, parameter: JobParameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    /// Inserts a parameter, returning the previous one under that name.
    pub fn insert(&mut self, name: impl Into<String>, parameter: JobParameter) -> Option<JobParameter> {
        self.parameters.insert(name.into(), parameter)
    }

    /// Gets a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&JobParameter> {
        self.parameters.get(name)
    }

    /// Gets a string parameter's value.
    #[must_use]
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)?.value() {
            ParameterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Gets a long parameter's value.
    #[must_use]
    pub fn get_long(&self, name: &str) -> Option<i64> {
        match self.get(name)?.value() {
            ParameterValue::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Gets a double parameter's value.
    #[must_use]
    pub fn get_double(&self, name: &str) -> Option<f64> {
        match self.get(name)?.value() {
            ParameterValue::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Gets a date parameter's value.
    #[must_use]
    pub fn get_date(&self, name: &str) -> Option<Timestamp> {
        match self.get(name)?.value() {
            ParameterValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the parameters that participate in job instance identity.
    #[must_use]
    pub fn identifying(&self) -> Self {
        Self {
            parameters: self
                .parameters
                .iter()
                .filter(|(_, p)| p.is_identifying())
                .map(|(k, p)| (k.clone(), p.clone()))
                .collect(),
        }
    }

    /// Iterates over the parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JobParameter)> {
        self.parameters.iter()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Computed; never part of the wire format.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl FromIterator<(String, JobParameter)> for JobParameters {
    fn from_iter<I: IntoIterator<Item = (String, JobParameter)>>(iter: I) -> Self {
        Self {
            parameters: iter.into_iter().collect(),
        }
    }
}
