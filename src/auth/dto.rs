use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Request body for requesting a verification code.
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub email: String,
}

/// Request body for completing signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub otp: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for change-password.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
        }
    }
}

/// Response returned after signup or login; the token also travels in the
/// session cookie.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Profile as returned by `/auth/me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for MeUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            created_at: u.created_at,
        }
    }
}

/// `/auth/me` never errors; an absent or invalid session is `user: null`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<MeUser>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn me_response_serializes_null_user() {
        let json = serde_json::to_value(MeResponse { user: None }).unwrap();
        assert!(json["user"].is_null());
    }

    #[test]
    fn me_user_uses_camel_case_and_rfc3339() {
        let me = MeUser {
            id: Uuid::new_v4(),
            email: "alice@x.com".into(),
            name: "Alice".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(MeResponse { user: Some(me) }).unwrap();
        assert_eq!(json["user"]["createdAt"], "1970-01-01T00:00:00Z");
        assert_eq!(json["user"]["email"], "alice@x.com");
    }

    #[test]
    fn change_password_request_accepts_camel_case() {
        let req: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword": "old-secret", "newPassword": "new-secret"}"#,
        )
        .unwrap();
        assert_eq!(req.current_password, "old-secret");
        assert_eq!(req.new_password, "new-secret");
    }
}
