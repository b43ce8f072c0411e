//! Error types for wire framing.

use std::fmt;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while framing or unframing request bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A form field was not a `key=value` pair.
    MalformedField {
        /// The offending fragment.
        field: String,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedField { field } => {
                write!(f, "form field {field:?} is not a key=value pair")
            }
        }
    }
}

impl std::error::Error for WireError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_malformed_field() {
        let err = WireError::MalformedField {
            field: "garbage".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("garbage"));
        assert!(msg.contains("key=value"));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<WireError>();
    }
}
