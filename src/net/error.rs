//! Uniform failure type for every backend call.
//!
//! ERROR HANDLING
//! ==============
//! Failed responses collapse into one human-readable message. A JSON body's
//! `message` wins over its `error`, and a body that is not JSON yields a
//! message carrying the numeric status. Callers match on the variant when
//! they need to tell a server refusal from a transport outage.

use serde_json::Value;

pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

/// Errors produced by gateway calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a readable response.
    #[error("request failed: {message}")]
    Transport { message: String },

    /// Non-success status whose body is not JSON.
    #[error("HTTP error! status: {status}")]
    UnreadableBody { status: u16 },

    /// Non-success status with a JSON body; `message` is surfaced verbatim.
    #[error("{message}")]
    Application { status: u16, message: String, code: Option<String> },

    /// Success status whose body does not match the expected shape.
    #[error("response decode failed (status {status}): {message}")]
    Decode { status: u16, message: String },

    /// The request body could not be serialized.
    #[error("request encode failed: {message}")]
    Encode { message: String },
}

impl ApiError {
    /// Build the error for a non-success response from its raw body text.
    #[must_use]
    pub fn from_failed_response(status: u16, body: &str) -> Self {
        let Ok(json) = serde_json::from_str::<Value>(body) else {
            return Self::UnreadableBody { status };
        };
        let message = non_empty_str(&json, "message")
            .or_else(|| non_empty_str(&json, "error"))
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_owned();
        let code = non_empty_str(&json, "code").map(str::to_owned);
        Self::Application { status, message, code }
    }

    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        Self::Transport { message: err.to_string() }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnreadableBody { status } | Self::Application { status, .. } | Self::Decode { status, .. } => {
                Some(*status)
            }
            Self::Transport { .. } | Self::Encode { .. } => None,
        }
    }

    /// Machine-readable code from the error body, if the server sent one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Application { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// True when the server answered and refused the request with a 4xx.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::Application { status, .. } | Self::UnreadableBody { status } => (400..500).contains(status),
            _ => false,
        }
    }
}

fn non_empty_str<'a>(json: &'a Value, key: &str) -> Option<&'a str> {
    json.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
