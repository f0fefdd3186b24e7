//! Error taxonomy for identity authority calls.
//!
//! Every failure surfaced by the connection layer is translated into exactly
//! one [`IdentityError`] variant so callers never see raw transport errors.
//! Translated errors serialize to a flat mapping of only their populated
//! attributes for transport to a caller.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;
use tonic::{Code, Status};

/// Result type for identity authority operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Error that can occur while talking to the identity authority.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// A required setting is missing or invalid. Fatal at startup.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The secured channel could not be established (unreadable trust
    /// anchor, unreachable endpoint, TLS failure).
    #[error("failed to connect to the identity authority: {detail}")]
    Connection { detail: String },

    /// A transient transport failure that persisted through the single
    /// reconnect-and-retry attempt.
    #[error("transient authority failure ({status}): {detail}")]
    Transient { status: String, detail: String },

    /// The authority reports no matching record.
    #[error("{detail}")]
    NotFound { detail: String },

    /// The authority rejected the caller's credentials or permissions.
    #[error("{detail}")]
    Forbidden { status: String, detail: String },

    /// The authority rejected the request contents.
    #[error("{detail}")]
    InvalidArgument { status: String, detail: String },

    /// A local validation failure naming a specific field.
    #[error("invalid value for field \"{field_name}\": {detail}")]
    Field { field_name: String, detail: String },

    /// Any other remote failure; the transport status code passes through.
    #[error("authority call failed ({status}): {detail}")]
    Remote {
        code: i32,
        status: String,
        detail: String,
    },

    /// A response payload could not be decoded.
    #[error("failed to decode authority response: {detail}")]
    Decode { detail: String },
}

impl IdentityError {
    /// Suggested numeric status for this error, if any.
    ///
    /// Mapped kinds carry their HTTP-equivalent status; [`Remote`] passes
    /// the transport status code through opaquely.
    ///
    /// [`Remote`]: IdentityError::Remote
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            IdentityError::NotFound { .. } => Some(404),
            IdentityError::Forbidden { .. } => Some(403),
            IdentityError::InvalidArgument { .. } | IdentityError::Field { .. } => Some(400),
            IdentityError::Remote { code, .. } => u16::try_from(*code).ok(),
            _ => None,
        }
    }

    /// The transport status name, when the error originated remotely.
    #[must_use]
    pub fn status_detail(&self) -> Option<&str> {
        match self {
            IdentityError::NotFound { .. } => Some("NOT_FOUND"),
            IdentityError::Forbidden { status, .. }
            | IdentityError::InvalidArgument { status, .. }
            | IdentityError::Transient { status, .. }
            | IdentityError::Remote { status, .. } => Some(status),
            _ => None,
        }
    }

    /// The offending field name for [`Field`] errors.
    ///
    /// [`Field`]: IdentityError::Field
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match self {
            IdentityError::Field { field_name, .. } => Some(field_name),
            _ => None,
        }
    }

    /// Whether the operation may succeed after reconnecting.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            IdentityError::Transient { .. } | IdentityError::Connection { .. }
        )
    }

    /// Flatten into a mapping of only the populated attributes.
    ///
    /// Keys never map to null or empty values, so the result is safe to hand
    /// to a response serializer as-is.
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("detail".into(), Value::String(self.detail().to_string()));
        if let Some(code) = self.status_code() {
            fields.insert("status_code".into(), Value::Number(code.into()));
        }
        if let Some(status) = self.status_detail() {
            fields.insert("status_detail".into(), Value::String(status.to_string()));
        }
        if let Some(field) = self.field_name() {
            fields.insert("field_name".into(), Value::String(field.to_string()));
        }
        fields
    }

    /// The human-readable detail string.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            IdentityError::Configuration { message } => message,
            IdentityError::Connection { detail }
            | IdentityError::Transient { detail, .. }
            | IdentityError::NotFound { detail }
            | IdentityError::Forbidden { detail, .. }
            | IdentityError::InvalidArgument { detail, .. }
            | IdentityError::Field { detail, .. }
            | IdentityError::Remote { detail, .. }
            | IdentityError::Decode { detail } => detail,
        }
    }

    /// Build an error from a local validation message.
    ///
    /// If the message quotes a field name (`invalid value for "email"`), the
    /// result is a [`Field`] error carrying that name; otherwise a generic
    /// [`InvalidArgument`].
    ///
    /// [`Field`]: IdentityError::Field
    /// [`InvalidArgument`]: IdentityError::InvalidArgument
    #[must_use]
    pub fn from_validation(message: impl Into<String>) -> Self {
        let detail = message.into();
        match quoted_field_name(&detail) {
            Some(field_name) => IdentityError::Field { field_name, detail },
            None => IdentityError::InvalidArgument {
                status: "INVALID_ARGUMENT".into(),
                detail,
            },
        }
    }

    /// Convenience constructor for connection failures.
    #[must_use]
    pub fn connection(detail: impl Into<String>) -> Self {
        IdentityError::Connection {
            detail: detail.into(),
        }
    }
}

impl From<crate::config::ConfigError> for IdentityError {
    fn from(err: crate::config::ConfigError) -> Self {
        IdentityError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Translate a transport status into the typed taxonomy.
///
/// Transient codes reaching this function have already exhausted the single
/// reconnect retry, so they surface as [`IdentityError::Transient`].
pub fn translate_status(operation: &str, status: Status) -> IdentityError {
    let detail = if status.message().is_empty() {
        format!("{operation} failed")
    } else {
        status.message().to_string()
    };
    let name = code_name(status.code()).to_string();

    match status.code() {
        Code::NotFound => IdentityError::NotFound { detail },
        Code::Unauthenticated | Code::PermissionDenied => IdentityError::Forbidden {
            status: name,
            detail,
        },
        Code::InvalidArgument | Code::OutOfRange => IdentityError::InvalidArgument {
            status: name,
            detail,
        },
        Code::Unavailable | Code::Internal | Code::DeadlineExceeded | Code::Unknown => {
            IdentityError::Transient {
                status: name,
                detail,
            }
        }
        code => IdentityError::Remote {
            code: code as i32,
            status: name,
            detail,
        },
    }
}

/// Whether a status code is expected to clear after a reconnect.
#[must_use]
pub fn is_transient_code(code: Code) -> bool {
    matches!(
        code,
        Code::Unavailable | Code::Internal | Code::DeadlineExceeded | Code::Unknown
    )
}

/// Extract the first double-quoted token from a validation message.
fn quoted_field_name(message: &str) -> Option<String> {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let re = QUOTED.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("valid regex"));
    re.captures(message)
        .map(|caps| caps[1].to_string())
}

/// SCREAMING_SNAKE_CASE name of a transport status code.
fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = translate_status("GetUserData", Status::not_found("no such user"));
        assert!(matches!(err, IdentityError::NotFound { .. }));
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.status_detail(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_unauthenticated_and_permission_denied_map_to_403() {
        for status in [
            Status::unauthenticated("bad token"),
            Status::permission_denied("not allowed"),
        ] {
            let err = translate_status("VerifyLogin", status);
            assert!(matches!(err, IdentityError::Forbidden { .. }));
            assert_eq!(err.status_code(), Some(403));
        }
    }

    #[test]
    fn test_invalid_argument_and_out_of_range_map_to_400() {
        for status in [
            Status::invalid_argument("bad field"),
            Status::out_of_range("too big"),
        ] {
            let err = translate_status("CreateUser", status);
            assert!(matches!(err, IdentityError::InvalidArgument { .. }));
            assert_eq!(err.status_code(), Some(400));
        }
    }

    #[test]
    fn test_transient_codes_translate_to_transient() {
        for status in [
            Status::unavailable("down"),
            Status::internal("boom"),
            Status::deadline_exceeded("slow"),
            Status::unknown("??"),
        ] {
            let err = translate_status("GetUserData", status);
            assert!(err.is_transient(), "expected transient: {err}");
        }
    }

    #[test]
    fn test_other_codes_pass_through() {
        let err = translate_status("CreateUser", Status::already_exists("duplicate"));
        match &err {
            IdentityError::Remote { code, status, .. } => {
                assert_eq!(*code, Code::AlreadyExists as i32);
                assert_eq!(status, "ALREADY_EXISTS");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
        assert_eq!(err.status_code(), Some(Code::AlreadyExists as u16));
    }

    #[test]
    fn test_validation_message_with_quoted_field() {
        let err = IdentityError::from_validation(r#"value for "email" is not a valid address"#);
        assert_eq!(err.field_name(), Some("email"));
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn test_validation_message_without_quoted_field() {
        let err = IdentityError::from_validation("request was malformed");
        assert!(matches!(err, IdentityError::InvalidArgument { .. }));
        assert!(err.field_name().is_none());
    }

    #[test]
    fn test_to_fields_skips_unpopulated_attributes() {
        let err = IdentityError::connection("refused");
        let fields = err.to_fields();
        assert_eq!(fields.get("detail").unwrap(), "refused");
        assert!(!fields.contains_key("status_code"));
        assert!(!fields.contains_key("status_detail"));
        assert!(!fields.contains_key("field_name"));
    }

    #[test]
    fn test_to_fields_for_field_error() {
        let err = IdentityError::from_validation(r#"field "national_id" already exists"#);
        let fields = err.to_fields();
        assert_eq!(fields.get("field_name").unwrap(), "national_id");
        assert_eq!(fields.get("status_code").unwrap(), 400);
    }

    #[test]
    fn test_empty_status_message_falls_back_to_operation() {
        let err = translate_status("GetRoles", Status::new(Code::NotFound, ""));
        assert_eq!(err.detail(), "GetRoles failed");
    }
}
