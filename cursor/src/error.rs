//! Error types for cursor operations.

use std::fmt;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors that can occur while reading or writing digit-encoded payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// Attempted to read past the end of the payload.
    UnexpectedEnd {
        /// Number of characters requested.
        requested: usize,
        /// Number of characters available.
        available: usize,
    },

    /// A length header or digit run contained a non-digit character.
    NonDigit {
        /// Position of the offending character.
        position: usize,
        /// The character found there.
        found: char,
    },

    /// Value exceeds the range the single-digit length prefix can describe.
    ValueTooLarge {
        /// The value that was out of range.
        value: u64,
    },

    /// A signed field was negative and cannot be digit-encoded.
    NegativeValue {
        /// The value that was negative.
        value: i64,
    },

    /// A digit run was too long to fit the decoded integer type.
    DigitOverflow {
        /// Number of digits in the run.
        count: usize,
    },

    /// A string field was longer than the one-digit length prefix allows.
    StringTooLong {
        /// Length of the offending string.
        length: usize,
    },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} characters but only {available} available"
                )
            }
            Self::NonDigit { position, found } => {
                write!(f, "expected a digit at position {position}, found {found:?}")
            }
            Self::ValueTooLarge { value } => {
                write!(f, "value {value} does not fit a single-digit length prefix")
            }
            Self::NegativeValue { value } => {
                write!(f, "value {value} is negative and cannot be digit-encoded")
            }
            Self::DigitOverflow { count } => {
                write!(f, "digit run of {count} characters overflows the value type")
            }
            Self::StringTooLong { length } => {
                write!(f, "string of {length} characters exceeds the 9 character field limit")
            }
        }
    }
}

impl std::error::Error for CursorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unexpected_end() {
        let err = CursorError::UnexpectedEnd {
            requested: 4,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains('4'), "should mention requested count");
        assert!(msg.contains('1'), "should mention available count");
    }

    #[test]
    fn error_display_non_digit() {
        let err = CursorError::NonDigit {
            position: 7,
            found: 'x',
        };
        let msg = err.to_string();
        assert!(msg.contains('7'), "should mention position");
        assert!(msg.contains('x'), "should mention the character");
    }

    #[test]
    fn error_display_value_too_large() {
        let err = CursorError::ValueTooLarge {
            value: 10_000_000_000,
        };
        assert!(err.to_string().contains("10000000000"));
    }

    #[test]
    fn error_display_negative_value() {
        let err = CursorError::NegativeValue { value: -3 };
        assert!(err.to_string().contains("-3"));
    }

    #[test]
    fn error_equality() {
        let err1 = CursorError::DigitOverflow { count: 25 };
        let err2 = CursorError::DigitOverflow { count: 25 };
        let err3 = CursorError::DigitOverflow { count: 26 };
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<CursorError>();
    }
}
