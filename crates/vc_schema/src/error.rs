use alloc::boxed::Box;
use alloc::string::{String, ToString};

use thiserror::Error;

// -----------------------------------------------------------------------------
// ConfigError

/// A schema is wired incorrectly.
///
/// Raised synchronously by [`assert_or_fail`](crate::assert_or_fail) and
/// propagated through `Result`, never through a [`Done`](crate::de::Done).
/// It is expected to be fixed by the schema author, not handled per input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid schema configuration: {message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// -----------------------------------------------------------------------------
// DataError

/// A particular JSON input could not be decoded.
///
/// Reported through the continuation as `done.fail(error)`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataError {
    #[error("expected a JSON object for `{type_name}`, found {found}")]
    NotAnObject {
        type_name: &'static str,
        found: &'static str,
    },

    #[error("cannot store {found} into a value of type `{expected}`")]
    FieldType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<DataError>,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

impl DataError {
    /// Creates a free-form error, usually from a custom deserializer.
    #[inline]
    pub fn custom(message: impl ToString) -> Self {
        Self::Custom(message.to_string())
    }

    /// Attaches the name of the field being decoded.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping all field wrappers.
    pub fn root_cause(&self) -> &DataError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the dotted field path leading to the root cause.
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut current = self;
        while let Self::Field { field, source } = current {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(field);
            current = source;
        }
        path
    }
}

// -----------------------------------------------------------------------------
// SerializeError

/// Serialization failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("field `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<SerializeError>,
    },

    #[error("{0}")]
    Custom(String),
}

impl SerializeError {
    #[inline]
    pub fn custom(message: impl ToString) -> Self {
        Self::Custom(message.to_string())
    }

    /// Attaches the name of the field being encoded.
    ///
    /// Configuration errors are returned unchanged.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        match self {
            Self::Config(_) => self,
            other => Self::Field {
                field: field.into(),
                source: Box::new(other),
            },
        }
    }

    #[inline]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// -----------------------------------------------------------------------------
// DeserializeError

/// Error of the top-level deserialization entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeserializeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    /// The continuation did not fire before the synchronous call returned.
    #[error("deserialization of `{type_name}` is still pending, use `deserialize_async`")]
    Incomplete { type_name: &'static str },
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{ConfigError, DataError, SerializeError};

    #[test]
    fn data_error_path() {
        let err = DataError::custom("bad").in_field("title").in_field("sub_task");
        assert_eq!(err.path(), "sub_task.title");
        assert!(matches!(err.root_cause(), DataError::Custom(msg) if msg == "bad"));
        assert_eq!(err.to_string(), "field `sub_task`: field `title`: bad");
    }

    #[test]
    fn config_is_never_wrapped() {
        let err = SerializeError::from(ConfigError::new("missing")).in_field("a");
        assert!(err.is_config());
        assert_eq!(err.to_string(), "invalid schema configuration: missing");

        let err = SerializeError::custom("nope").in_field("a");
        assert!(!err.is_config());
        assert_eq!(err.to_string(), "field `a`: nope");
    }
}
