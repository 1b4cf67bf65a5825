use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the HTTP surface.
///
/// Every response body is `{ "error": <summary> }`, plus an `"errors"`
/// map keyed by field name when a form consumer can highlight fields.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input, collected per field rather than fail-fast.
    #[error("{summary}")]
    Validation {
        summary: String,
        errors: BTreeMap<&'static str, String>,
    },

    /// Malformed input without a field map (e.g. an unknown activity type).
    #[error("{0}")]
    BadRequest(String),

    /// Missing/invalid session or bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Uniqueness violation, e.g. duplicate email on signup.
    #[error("{message}")]
    Conflict {
        message: String,
        field: &'static str,
    },

    /// A collaborator (mailer, analysis provider) is unconfigured or failed.
    #[error("{0}")]
    Dependency(String),

    /// Anything unexpected; logged server-side, generic to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<&'static str, String>>,
}

impl ApiError {
    pub fn validation(summary: impl Into<String>, errors: BTreeMap<&'static str, String>) -> Self {
        Self::Validation {
            summary: summary.into(),
            errors,
        }
    }

    /// Single-field 400 with the same `{error, errors}` shape as a form error.
    pub fn field(
        field: &'static str,
        message: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field, message.into());
        Self::Validation {
            summary: summary.into(),
            errors,
        }
    }

    /// The one constructor for failed logins, so unknown-email and
    /// wrong-password responses are byte-identical.
    pub fn invalid_credentials() -> Self {
        Self::Unauthorized("Invalid email or password".into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Dependency(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Validation { summary, errors } => ErrorBody {
                error: summary.clone(),
                errors: Some(errors.clone()),
            },
            Self::BadRequest(message) | Self::Unauthorized(message) | Self::Dependency(message) => {
                ErrorBody {
                    error: message.clone(),
                    errors: None,
                }
            }
            Self::Conflict { message, field } => {
                let mut errors = BTreeMap::new();
                errors.insert(*field, message.clone());
                ErrorBody {
                    error: message.clone(),
                    errors: Some(errors),
                }
            }
            Self::Internal(e) => ErrorBody {
                error: if cfg!(debug_assertions) {
                    e.to_string()
                } else {
                    "Something went wrong. Please try again.".into()
                },
                errors: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_carries_field_map() {
        let mut errors = BTreeMap::new();
        errors.insert("email", "Email is required".to_string());
        errors.insert("password", "Password is required".to_string());
        let err = ApiError::validation("Please fix the errors below", errors);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(json["error"], "Please fix the errors below");
        assert_eq!(json["errors"]["email"], "Email is required");
        assert_eq!(json["errors"]["password"], "Password is required");
    }

    #[test]
    fn bad_request_body_has_no_field_map() {
        let err = ApiError::BadRequest("Invalid activity type".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(json["error"], "Invalid activity type");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn login_failures_are_indistinguishable() {
        let unknown_email = ApiError::invalid_credentials();
        let wrong_password = ApiError::invalid_credentials();
        assert_eq!(
            serde_json::to_value(unknown_email.body()).unwrap(),
            serde_json::to_value(wrong_password.body()).unwrap()
        );
        assert_eq!(unknown_email.status(), wrong_password.status());
    }

    #[test]
    fn conflict_maps_to_409_with_field() {
        let err = ApiError::Conflict {
            message: "An account with this email already exists".into(),
            field: "email",
        };
        assert_eq!(err.status(), StatusCode::CONFLICT);
        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(
            json["errors"]["email"],
            "An account with this email already exists"
        );
    }
}
