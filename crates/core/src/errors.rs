//! Core error types for the Donasi client.
//!
//! This module defines transport-agnostic error types. HTTP-specific failures
//! are normalized into [`ApiError`] by the client crate before they reach the
//! form or the status poller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::donations::FieldErrors;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the donation workflow.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid form state: {0}")]
    InvalidState(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for donor input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// One or more form fields failed their rules.
    #[error("{0}")]
    Fields(FieldErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Broad category of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorKind {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Transport,
    /// The server answered with a 4xx status.
    Client,
    /// The server answered with a 5xx status.
    Server,
    /// The server answered successfully but the body could not be understood.
    Decode,
}

/// A normalized API failure with a single user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            status: None,
            message: message.into(),
        }
    }

    pub fn decode(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            status,
            message: message.into(),
        }
    }

    /// Create an error for a non-success HTTP status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        let kind = if status >= 500 {
            ApiErrorKind::Server
        } else {
            ApiErrorKind::Client
        };
        Self {
            kind,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind == ApiErrorKind::Transport
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Validation(ValidationError::Fields(errors))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
