//! Error types for request handling.

use std::fmt;

use codec::CodecError;
use store::{QueryError, StoreError};
use wire::WireError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur while handling a client request.
///
/// Nothing here is retried or recovered; every variant propagates to the
/// transport, which maps it to a client-visible response.
#[derive(Debug)]
pub enum ServiceError {
    /// Request framing error.
    Wire(WireError),

    /// Payload decode or encode error.
    Codec(CodecError),

    /// Store error.
    Store(StoreError),

    /// Query construction error.
    Query(QueryError),

    /// The request named an action outside the protocol.
    UnsupportedAction {
        /// The offending action value.
        action: String,
    },

    /// The action exists in the protocol but has no implementation yet.
    ///
    /// Distinct from a genuine fault so the transport can answer it
    /// deliberately.
    NotImplemented {
        /// The unimplemented action.
        action: &'static str,
    },

    /// A required request field was absent.
    MissingParameter {
        /// The missing field name.
        name: &'static str,
    },

    /// A request field failed to parse.
    InvalidParameter {
        /// The field name.
        name: &'static str,
        /// The raw value received.
        value: String,
    },

    /// The addressed save profile does not exist.
    ProfileNotFound {
        /// The composed profile key.
        key: String,
    },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Codec(e) => write!(f, "codec error: {e}"),
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::Query(e) => write!(f, "query error: {e}"),
            Self::UnsupportedAction { action } => {
                write!(f, "unexpected action: {action}")
            }
            Self::NotImplemented { action } => {
                write!(f, "action {action} is not implemented")
            }
            Self::MissingParameter { name } => {
                write!(f, "request is missing the {name} field")
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "request field {name}={value:?} is invalid")
            }
            Self::ProfileNotFound { key } => {
                write!(f, "no stored profile under key {key:?}")
            }
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Query(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WireError> for ServiceError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}

impl From<CodecError> for ServiceError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        Self::Query(err)
    }
}
