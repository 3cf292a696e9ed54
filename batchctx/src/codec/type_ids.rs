//! Type identifiers embedded by the current format.

#![allow(missing_docs)]

/// Property that carries an object's type identifier.
pub const CLASS_PROPERTY: &str = "@class";

pub const HASH_MAP: &str = "java.util.HashMap";
pub const LINKED_HASH_MAP: &str = "java.util.LinkedHashMap";
pub const TREE_MAP: &str = "java.util.TreeMap";
pub const CONCURRENT_HASH_MAP: &str = "java.util.concurrent.ConcurrentHashMap";

pub const ARRAY_LIST: &str = "java.util.ArrayList";
pub const LINKED_LIST: &str = "java.util.LinkedList";
pub const ARRAYS_LIST: &str = "java.util.Arrays$ArrayList";
pub const EMPTY_LIST: &str = "java.util.Collections$EmptyList";

pub const LONG: &str = "java.lang.Long";
pub const INTEGER: &str = "java.lang.Integer";
pub const DOUBLE: &str = "java.lang.Double";
pub const FLOAT: &str = "java.lang.Float";
pub const STRING: &str = "java.lang.String";
pub const BOOLEAN: &str = "java.lang.Boolean";

pub const DATE: &str = "java.util.Date";
pub const SQL_DATE: &str = "java.sql.Date";
pub const SQL_TIMESTAMP: &str = "java.sql.Timestamp";

pub const JOB_PARAMETER: &str = "org.springframework.batch.core.JobParameter";
pub const JOB_PARAMETERS: &str = "org.springframework.batch.core.JobParameters";

/// What a type identifier decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// A string-keyed map, carried as an object.
    Map,
    /// A sequence, carried as `[id, [...]]`.
    List,
    /// An integer, carried as `[id, n]`.
    Long,
    /// A float, carried as `[id, n]`.
    Double,
    /// Epoch milliseconds, carried as `[id, n]`.
    Date,
    /// A string, carried as `[id, "s"]`.
    String,
    /// A boolean, carried as `[id, b]`.
    Bool,
    /// A job parameter object.
    JobParameter,
    /// A job parameters object.
    JobParameters,
    /// A trusted identifier without a dedicated model; decoded structurally.
    Generic,
}

impl TypeShape {
    /// Whether this shape is carried as an object with a class property.
    #[must_use]
    pub const fn is_object(self) -> bool {
        matches!(
            self,
            Self::Map | Self::JobParameter | Self::JobParameters | Self::Generic
        )
    }
}

/// Resolves one of the built-in identifiers.
#[must_use]
pub fn builtin_shape(type_id: &str) -> Option<TypeShape> {
    let shape = match type_id {
        HASH_MAP | LINKED_HASH_MAP | TREE_MAP | CONCURRENT_HASH_MAP => TypeShape::Map,
        ARRAY_LIST | LINKED_LIST | ARRAYS_LIST | EMPTY_LIST => TypeShape::List,
        LONG | INTEGER => TypeShape::Long,
        DOUBLE | FLOAT => TypeShape::Double,
        DATE | SQL_DATE | SQL_TIMESTAMP => TypeShape::Date,
        STRING => TypeShape::String,
        BOOLEAN => TypeShape::Bool,
        JOB_PARAMETER => TypeShape::JobParameter,
        JOB_PARAMETERS => TypeShape::JobParameters,
        _ => return None,
    };
    Some(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_shapes() {
        assert_eq!(builtin_shape(HASH_MAP), Some(TypeShape::Map));
        assert_eq!(builtin_shape(INTEGER), Some(TypeShape::Long));
        assert_eq!(builtin_shape(SQL_TIMESTAMP), Some(TypeShape::Date));
        assert_eq!(builtin_shape(JOB_PARAMETERS), Some(TypeShape::JobParameters));
        assert_eq!(builtin_shape("com.example.Order"), None);
    }

    #[test]
    fn test_object_shapes() {
        assert!(TypeShape::Map.is_object());
        assert!(TypeShape::JobParameter.is_object());
        assert!(!TypeShape::Long.is_object());
        assert!(!TypeShape::List.is_object());
    }
}
