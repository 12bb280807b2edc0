//! Response envelope returned for every command

use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::command::executor::Outcome;
use crate::core::error::{CodedError, DispatchError, ErrorCode};

/// Message used for any command that fails to parse
pub const INVALID_EXPRESSION: &str = "invalid cmd exp";

/// Uniform `{ret, result, msg}` envelope
///
/// `ret == 0` with an empty `msg` is success; anything else is a failure with
/// a human-readable `msg` and normally no `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "ret")]
    pub code: ErrorCode,
    #[serde(rename = "result", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(rename = "msg", default)]
    pub content: String,
}

impl Response {
    pub fn ok(result: Option<serde_json::Value>) -> Self {
        Self {
            code: ErrorCode::OK,
            result: result.filter(|v| !v.is_null()),
            content: String::new(),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            result: None,
            content: message.into(),
        }
    }

    /// Failure with the generic command-message code
    pub fn cmsg_error(message: impl Into<String>) -> Self {
        Self::error(ErrorCode::SERVER_CMSG_ERROR, message)
    }

    pub fn invalid_expression() -> Self {
        Self::cmsg_error(INVALID_EXPRESSION)
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }

    /// Envelope for a dispatch failure; coded errors pass through
    pub fn from_dispatch_error(err: DispatchError) -> Self {
        match err {
            DispatchError::Coded(coded) => coded.into(),
            other => Self::cmsg_error(other.to_string()),
        }
    }

    /// Envelope for a normalized handler outcome
    pub fn from_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Nil => Self::ok(None),
            Outcome::Value(value) => Self::ok(Some(value)),
            Outcome::Error(err) => match err.downcast::<CodedError>() {
                Ok(coded) => (*coded).into(),
                Err(err) => Self::cmsg_error(err.to_string()),
            },
        }
    }

    /// Envelope for a caught panic
    pub fn from_fault(payload: &(dyn Any + Send)) -> Self {
        Self::cmsg_error(fault_message(payload))
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl From<CodedError> for Response {
    fn from(err: CodedError) -> Self {
        Self::error(err.code, err.message)
    }
}

pub(crate) fn fault_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown fault".to_string()
    }
}
