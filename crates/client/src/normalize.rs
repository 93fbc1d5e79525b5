//! Error normalization at the API boundary.
//!
//! Backend failures come in several shapes (`message`, `error`,
//! `error.message`, `data.message`, Laravel-style `errors` maps). They are
//! reduced here, once, to a single [`ApiError`] so that callers never dig
//! through response bodies themselves.

use donasi_core::constants::GENERIC_SUBMISSION_ERROR;
use donasi_core::errors::ApiError;
use serde_json::Value;

use crate::error::ClientError;

const TRANSPORT_ERROR_MESSAGE: &str =
    "Tidak dapat terhubung ke server. Periksa koneksi internet Anda.";
const DECODE_ERROR_MESSAGE: &str = "Respons server tidak dapat dibaca.";

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First message found in an `errors` value: a map of field → messages, a
/// list of messages, or a list of `{ message }` objects.
fn first_listed_message(errors: &Value) -> Option<String> {
    match errors {
        Value::String(_) => non_empty(Some(errors)),
        Value::Array(items) => items.iter().find_map(|item| {
            non_empty(Some(item)).or_else(|| non_empty(item.get("message")))
        }),
        Value::Object(fields) => fields.values().find_map(first_listed_message),
        _ => None,
    }
}

/// Pull the most specific human-readable message out of an error body.
pub fn extract_message(body: &Value) -> Option<String> {
    non_empty(body.get("message"))
        .or_else(|| non_empty(body.get("error")))
        .or_else(|| non_empty(body.get("error").and_then(|e| e.get("message"))))
        .or_else(|| non_empty(body.get("data").and_then(|d| d.get("message"))))
        .or_else(|| body.get("errors").and_then(first_listed_message))
}

/// Normalize a non-success HTTP response.
pub fn normalize_error_body(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(extract_message)
        .unwrap_or_else(|| GENERIC_SUBMISSION_ERROR.to_string());
    ApiError::http(status, message)
}

/// Normalize any client failure.
pub fn normalize_client_error(err: &ClientError) -> ApiError {
    match err {
        ClientError::Api { status, body } => normalize_error_body(*status, body),
        ClientError::Http(e) => match e.status() {
            Some(status) => ApiError::http(status.as_u16(), GENERIC_SUBMISSION_ERROR),
            None if e.is_decode() => ApiError::decode(None, DECODE_ERROR_MESSAGE),
            None => ApiError::transport(TRANSPORT_ERROR_MESSAGE),
        },
        ClientError::Json(_) => ApiError::decode(None, DECODE_ERROR_MESSAGE),
        ClientError::InvalidConfig(message) => ApiError::transport(message.clone()),
    }
}

impl From<ClientError> for donasi_core::Error {
    fn from(err: ClientError) -> Self {
        log::debug!("[DonasiApi] Normalizing error: {}", err);
        donasi_core::Error::Api(normalize_client_error(&err))
    }
}
