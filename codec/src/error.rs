//! Error types for payload loading and encoding.

use std::fmt;

use cursor::CursorError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while loading or encoding save payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Digit cursor error.
    Cursor(CursorError),

    /// The cursor did not land on the payload's declared total length.
    LengthMismatch {
        /// Length declared by the payload header.
        expected: usize,
        /// Position the cursor actually finished at.
        actual: usize,
    },

    /// A party entry carried a field tag outside the protocol.
    UnknownFieldTag {
        /// The raw tag value.
        tag: u64,
    },

    /// A party entry addressed a save id that is not stored.
    PokemonNotFound {
        /// The missing save id.
        save_id: u64,
    },

    /// A full-data field arrived for an entry that already has a record.
    UnexpectedFullData {
        /// Save id of the entry.
        save_id: u64,
    },

    /// An update field arrived for a fresh entry before its full data.
    FieldBeforeFullData {
        /// The raw tag value that arrived too early.
        tag: u64,
    },

    /// A nickname update referenced a payload position with no nickname.
    NicknameMissing {
        /// 1-based payload position.
        position: u64,
    },

    /// The profile form did not carry `Save=true`.
    MissingSaveFlag,

    /// No stored profile and the form did not carry `NewGameSave=true`.
    MissingNewGame,

    /// A gated profile field was missing its value.
    MissingField {
        /// Form key of the missing value.
        name: &'static str,
    },

    /// A profile field value failed to parse.
    InvalidFieldValue {
        /// Form key of the bad value.
        name: &'static str,
        /// The raw value received.
        value: String,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cursor(e) => write!(f, "cursor error: {e}"),
            Self::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "payload declared {expected} characters but the cursor finished at {actual}"
                )
            }
            Self::UnknownFieldTag { tag } => {
                write!(f, "unexpected party update field id {tag}")
            }
            Self::PokemonNotFound { save_id } => {
                write!(f, "no stored pokemon with save id {save_id}")
            }
            Self::UnexpectedFullData { save_id } => {
                write!(f, "full data for save id {save_id} which already has a record")
            }
            Self::FieldBeforeFullData { tag } => {
                write!(f, "field id {tag} for a fresh entry before its full data")
            }
            Self::NicknameMissing { position } => {
                write!(f, "no nickname supplied for payload position {position}")
            }
            Self::MissingSaveFlag => write!(f, "profile form is missing Save=true"),
            Self::MissingNewGame => {
                write!(f, "no stored profile and the form is missing NewGameSave=true")
            }
            Self::MissingField { name } => {
                write!(f, "profile form is missing the {name} value")
            }
            Self::InvalidFieldValue { name, value } => {
                write!(f, "profile form value {name}={value:?} is not a number")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cursor(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CursorError> for CodecError {
    fn from(err: CursorError) -> Self {
        Self::Cursor(err)
    }
}
