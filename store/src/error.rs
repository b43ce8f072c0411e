//! Error types for the store.

use std::fmt;
use std::path::PathBuf;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the document codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A model tag was not registered before encoding or decoding.
    UnregisteredModel {
        /// The model tag name.
        name: String,
    },

    /// A function reference was not registered before encoding or decoding.
    UnregisteredFunction {
        /// The function name.
        name: String,
    },

    /// Registering a model or function name twice.
    DuplicateRegistration {
        /// The name registered twice.
        name: String,
    },

    /// A load-method marker named a method this codec does not know.
    UnknownLoadMethod {
        /// The marker value found.
        method: String,
    },

    /// A timestamp sentinel did not parse as ISO-8601.
    BadTimestamp {
        /// The raw string after the sentinel prefix.
        value: String,
    },

    /// A list element cannot be stored (nested list, timestamp, reference).
    UnsupportedListElement {
        /// What kind of element was found.
        kind: &'static str,
    },

    /// The top of a document must be a map or model.
    TopLevelNotMap {
        /// What kind of value was found instead.
        kind: &'static str,
    },

    /// A document value has no physical representation (reference, model).
    UnsupportedConversion {
        /// What kind of value was found.
        kind: &'static str,
    },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnregisteredModel { name } => {
                write!(f, "model {name:?} was never registered")
            }
            Self::UnregisteredFunction { name } => {
                write!(f, "function {name:?} was never registered")
            }
            Self::DuplicateRegistration { name } => {
                write!(f, "{name:?} is already registered")
            }
            Self::UnknownLoadMethod { method } => {
                write!(f, "unknown load method {method:?}")
            }
            Self::BadTimestamp { value } => {
                write!(f, "timestamp {value:?} is not valid ISO-8601")
            }
            Self::UnsupportedListElement { kind } => {
                write!(f, "cannot store a {kind} inside a list")
            }
            Self::TopLevelNotMap { kind } => {
                write!(f, "documents must be maps, got a {kind}")
            }
            Self::UnsupportedConversion { kind } => {
                write!(f, "a {kind} has no plain value form")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// Errors that can occur at query construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Two conditions on the same field with the same operator.
    DuplicateCondition {
        /// The field named twice.
        field: String,
        /// The repeated operator.
        operator: &'static str,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCondition { field, operator } => {
                write!(
                    f,
                    "query already has a {operator} condition on field {field:?}"
                )
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Errors that can occur in the embedded base and database wrapper.
#[derive(Debug)]
pub enum StoreError {
    /// The key does not exist.
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// The key already exists and the operation required it not to.
    KeyExists {
        /// The duplicate key.
        key: String,
    },

    /// Document codec error.
    Document(DocumentError),

    /// A record failed to (de)serialize.
    InvalidRecord(serde_json::Error),

    /// An update operator hit a missing field or a field of the wrong type.
    InvalidUpdate {
        /// The record key.
        key: String,
        /// The field the operator targeted.
        field: String,
    },

    /// Writing the disk mirror failed.
    Persist {
        /// The mirror file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns `true` for the distinguishable not-found condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound { key } => write!(f, "key {key:?} not found"),
            Self::KeyExists { key } => write!(f, "item with key {key:?} already exists"),
            Self::Document(e) => write!(f, "document error: {e}"),
            Self::InvalidRecord(e) => write!(f, "record error: {e}"),
            Self::InvalidUpdate { key, field } => {
                write!(
                    f,
                    "update operator cannot apply to field {field:?} of {key:?}"
                )
            }
            Self::Persist { path, source } => {
                write!(f, "failed to mirror store to {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Document(e) => Some(e),
            Self::InvalidRecord(e) => Some(e),
            Self::Persist { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DocumentError> for StoreError {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRecord(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_key_not_found() {
        let err = StoreError::KeyNotFound {
            key: "bob$1".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bob$1"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn error_display_key_exists() {
        let err = StoreError::KeyExists {
            key: "bob$1".to_owned(),
        };
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn not_found_is_distinguishable() {
        let not_found = StoreError::KeyNotFound {
            key: "x".to_owned(),
        };
        let exists = StoreError::KeyExists {
            key: "x".to_owned(),
        };
        assert!(not_found.is_not_found());
        assert!(!exists.is_not_found());
    }

    #[test]
    fn document_error_display() {
        let err = DocumentError::UnregisteredModel {
            name: "Trainer".to_owned(),
        };
        assert!(err.to_string().contains("Trainer"));
    }

    #[test]
    fn query_error_display() {
        let err = QueryError::DuplicateCondition {
            field: "age".to_owned(),
            operator: "lt",
        };
        let msg = err.to_string();
        assert!(msg.contains("age"));
        assert!(msg.contains("lt"));
    }

    #[test]
    fn errors_are_std_errors() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<StoreError>();
        assert_error::<DocumentError>();
        assert_error::<QueryError>();
    }
}
