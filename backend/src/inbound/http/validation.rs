//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every client-side failure becomes an `invalid_request` error whose
//! `details` object names the offending field and a stable code.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde_json::json;
use tracing::debug;

use crate::domain::{Error, UserId, UserValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidId,
    NonPositiveId,
    EmptyEmail,
    EmailTooShort,
    EmailTooLong,
    InvalidEmail,
    EmptyName,
    NameTooLong,
    InvalidJson,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::NonPositiveId => "non_positive_id",
            ErrorCode::EmptyEmail => "empty_email",
            ErrorCode::EmailTooShort => "email_too_short",
            ErrorCode::EmailTooLong => "email_too_long",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::EmptyName => "empty_name",
            ErrorCode::NameTooLong => "name_too_long",
            ErrorCode::InvalidJson => "invalid_json",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

const ID: FieldName = FieldName::new("id");
const EMAIL: FieldName = FieldName::new("email");
const NAME: FieldName = FieldName::new("name");

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_error_with_value(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Parse the `{id}` path segment into a [`UserId`].
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse::<UserId>().map_err(|err| {
        let code = match err {
            UserValidationError::NonPositiveId => ErrorCode::NonPositiveId,
            _ => ErrorCode::InvalidId,
        };
        field_error_with_value(ID, code, err.to_string(), raw)
    })
}

/// Map a payload validation failure to an `invalid_request` error.
pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match &err {
        UserValidationError::InvalidId => (ID, ErrorCode::InvalidId),
        UserValidationError::NonPositiveId => (ID, ErrorCode::NonPositiveId),
        UserValidationError::EmptyEmail => (EMAIL, ErrorCode::EmptyEmail),
        UserValidationError::EmailTooShort { .. } => (EMAIL, ErrorCode::EmailTooShort),
        UserValidationError::EmailTooLong { .. } => (EMAIL, ErrorCode::EmailTooLong),
        UserValidationError::InvalidEmail => (EMAIL, ErrorCode::InvalidEmail),
        UserValidationError::EmptyName => (NAME, ErrorCode::EmptyName),
        UserValidationError::NameTooLong { .. } => (NAME, ErrorCode::NameTooLong),
    };
    field_error(field, code, err.to_string())
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON payload");
    let message = match &err {
        JsonPayloadError::ContentType => "request body must be application/json".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid JSON body: {inner}"),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "request body is too large".to_owned()
        }
        _ => "invalid JSON body".to_owned(),
    };
    Error::invalid_request(message)
        .with_details(json!({ "code": ErrorCode::InvalidJson.as_str() }))
        .into()
}

/// JSON extractor configuration that reports malformed bodies with the
/// shared error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}
