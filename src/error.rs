//! Error taxonomy shared by every layer of the client.
//!
//! Callers only ever see three kinds of failure:
//!
//! - [`Error::MissingParameter`] - a required argument was absent or empty. Raised
//!   before any network call is made.
//! - [`Error::InvalidCredential`] - Spotify rejected the bearer token or the client
//!   credentials.
//! - [`Error::UnexpectedFailure`] - anything else. The wrapped [`Failure`] keeps the
//!   original status, payload or transport error for diagnostics.
//!
//! Nothing in this crate retries on its own. Retrying after an
//! `InvalidCredential` requires a fresh token which the caller must obtain
//! explicitly.

use reqwest::{StatusCode, header::HeaderMap};
use serde_json::Value;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// OAuth error codes returned by the token endpoint that mean the credentials
/// themselves were rejected.
const CREDENTIAL_ERROR_CODES: [&str; 3] = ["invalid_client", "invalid_grant", "unauthorized_client"];

#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was missing or empty. Carries the field name.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// The bearer token or client credentials were rejected.
    #[error("invalid credential (status {status}): {message}")]
    InvalidCredential {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// Any other remote rejection, transport failure or malformed response.
    #[error("unexpected failure: {0}")]
    UnexpectedFailure(#[from] Failure),
}

/// Underlying cause of an [`Error::UnexpectedFailure`].
#[derive(Debug, Error)]
pub enum Failure {
    #[error("Spotify responded with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        payload: Option<Value>,
        retry_after: Option<u64>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("image decoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0} seconds")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for an [`Error::UnexpectedFailure`] with a free-form message.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Error::UnexpectedFailure(Failure::Other(message.into()))
    }

    /// HTTP status attached to the error, if the remote API produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::InvalidCredential { status, .. } => Some(*status),
            Error::UnexpectedFailure(Failure::Status { status, .. }) => Some(*status),
            Error::UnexpectedFailure(Failure::Transport(e)) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Provider supplied error body, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Error::InvalidCredential { payload, .. } => payload.as_ref(),
            Error::UnexpectedFailure(Failure::Status { payload, .. }) => payload.as_ref(),
            _ => None,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::InvalidCredential { .. })
    }

    /// Seconds Spotify asked us to wait before retrying (429 responses).
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::UnexpectedFailure(Failure::Status { retry_after, .. }) => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::UnexpectedFailure(Failure::Transport(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::UnexpectedFailure(Failure::Decode(err))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::UnexpectedFailure(Failure::Image(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::UnexpectedFailure(Failure::Io(err))
    }
}

/// Returns `Err(MissingParameter(field))` when `value` is absent or blank.
pub(crate) fn require<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::MissingParameter(field)),
    }
}

/// Turns a non-2xx response into the matching error kind.
///
/// Resource endpoints answer with `{"error": {"status", "message"}}` while the
/// accounts service uses the OAuth shape `{"error", "error_description"}`. Both
/// are understood.
pub(crate) fn classify(status: StatusCode, headers: &HeaderMap, body: &str) -> Error {
    let payload: Option<Value> = serde_json::from_str(body).ok();

    let oauth_code = payload
        .as_ref()
        .and_then(|p| p.get("error"))
        .and_then(|e| e.as_str())
        .map(|s| s.to_string());

    let message = payload
        .as_ref()
        .and_then(|p| {
            p.get("error_description")
                .and_then(|d| d.as_str())
                .or_else(|| p.pointer("/error/message").and_then(|m| m.as_str()))
                .or_else(|| p.get("error").and_then(|e| e.as_str()))
        })
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });

    let credential_rejected = status == StatusCode::UNAUTHORIZED
        || (status == StatusCode::BAD_REQUEST
            && oauth_code
                .as_deref()
                .is_some_and(|code| CREDENTIAL_ERROR_CODES.contains(&code)));

    if credential_rejected {
        return Error::InvalidCredential {
            status: status.as_u16(),
            message,
            payload,
        };
    }

    let retry_after = headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    Error::UnexpectedFailure(Failure::Status {
        status: status.as_u16(),
        message,
        payload,
        retry_after,
    })
}
