use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::ParamKind;

/// Boxed error returned by handlers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Numeric error-kind code carried on the wire as `ret`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const OK: ErrorCode = ErrorCode(0);
    /// Malformed or failed command message
    pub const SERVER_CMSG_ERROR: ErrorCode = ErrorCode(2);

    pub fn is_ok(&self) -> bool {
        *self == Self::OK
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error that already carries its wire code
///
/// Passed through to the response envelope unchanged, whether a handler
/// returns it or it surfaces from dispatch.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CodedError {
    pub code: ErrorCode,
    pub message: String,
}

impl CodedError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Failure to resolve, check, coerce or invoke a command
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("cmd not found")]
    NotFound,

    #[error("cmd param not enough")]
    ParamNotEnough,

    #[error("invalid {kind} param: {token}")]
    InvalidParam { kind: ParamKind, token: String },

    #[error(transparent)]
    Coded(#[from] CodedError),

    /// Handler registered with an argument list that does not match its invoker
    #[error("{0}")]
    Fault(String),
}

/// Command text is not a parseable call expression
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error: {message}")]
pub struct SyntaxError {
    pub message: String,
}
