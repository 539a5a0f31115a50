//! Error types returned by the client.
use reqwest::{StatusCode, header::InvalidHeaderValue};
use serde::Deserialize;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the PagerDuty API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("PagerDuty API returned {status}: {message}")]
    Api {
        /// HTTP status of the response
        status: StatusCode,
        /// `error.message` from the response body, or the raw body
        message: String,
    },
    /// The request URL could not be built from the configured base URL.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
    /// A header value (e.g. `From`) is not a valid HTTP header value.
    #[error("invalid value for header `{name}`")]
    InvalidHeader {
        /// Header name
        name: &'static str,
        /// Underlying error
        #[source]
        source: InvalidHeaderValue,
    },
    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    /// The response body is not valid JSON for the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
    /// The response is valid JSON but lacks the expected envelope key.
    #[error("JSON response does not have {0} field")]
    MissingField(&'static str),
}

impl Error {
    /// Returns `true` if the response was well-formed JSON missing its envelope key.
    pub const fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField(_))
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Build an [`Error::Api`] from a non-2xx response body.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: Inner,
        }
        #[derive(Deserialize)]
        struct Inner {
            message: String,
        }

        let message = serde_json::from_str::<Envelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_owned());
        Self::Api { status, message }
    }
}

/// A string is not a known value of an API enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseValueError {
    kind: &'static str,
    value: String,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_owned() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_uses_pagerduty_message() {
        let body = r#"{"error":{"message":"Invalid Input Provided","code":2001,"errors":["x"]}}"#;
        let err = Error::from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.to_string(), "PagerDuty API returned 400 Bad Request: Invalid Input Provided");
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let err = Error::from_response(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            Error::Api { message, .. } => assert_eq!(message, "upstream down"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_distinguishable() {
        let err = Error::MissingField("incident");
        assert!(err.is_missing_field());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "JSON response does not have incident field");
    }
}
