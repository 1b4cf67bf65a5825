use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, MeResponse, SendOtpRequest,
            SignupRequest, SuccessResponse,
        },
        otp,
        password::{hash_password, verify_password, PASSWORD_MIN_LEN},
        repo::CreateUserError,
        repo_types::User,
        session::{
            clear_session_cookie, session_cookie, AuthUser, SessionKeys, SESSION_COOKIE,
        },
        validation,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/change-password", post(change_password))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(mut payload): Json<SendOtpRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if let Err(message) = validation::validate_email(&payload.email) {
        warn!(email = %payload.email, "send-otp invalid email");
        return Err(ApiError::field("email", message.clone(), message));
    }

    let code = otp::issue(&state.db, &payload.email).await?;

    if let Err(e) = state.mailer.send_otp(&payload.email, &code).await {
        error!(error = %e, email = %payload.email, "otp delivery failed");
        return Err(ApiError::Dependency(
            "Failed to send verification email. Please try again.".into(),
        ));
    }

    info!(email = %payload.email, "verification code sent");
    Ok(Json(SuccessResponse::with_message(
        "Verification code sent to your email.",
    )))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.otp = payload.otp.trim().to_string();
    payload.name = payload.name.trim().to_string();

    let errors =
        validation::validate_signup(&payload.email, &payload.otp, &payload.name, &payload.password);
    if !errors.is_empty() {
        return Err(ApiError::validation("Please fix the errors below", errors));
    }

    if !otp::consume(&state.db, &payload.email, &payload.otp).await? {
        warn!(email = %payload.email, "signup with invalid or expired code");
        return Err(ApiError::field(
            "otp",
            "Invalid or expired code. Request a new one.",
            "Invalid or expired verification code",
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = match User::create(&state.db, &payload.email, &hash, &payload.name).await {
        Ok(u) => u,
        Err(CreateUserError::EmailTaken) => {
            warn!(email = %payload.email, "signup email already registered");
            return Err(ApiError::Conflict {
                message: "An account with this email already exists".into(),
                field: "email",
            });
        }
        Err(CreateUserError::Db(e)) => {
            error!(error = %e, "create user failed");
            return Err(ApiError::Internal(e.into()));
        }
    };

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    let jar = jar.add(session_cookie(
        token.clone(),
        keys.ttl(),
        state.config.production,
    ));

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        jar,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".into(),
        ));
    }

    // Unknown email and wrong password produce the same response.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::invalid_credentials());
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::invalid_credentials());
    }

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    let jar = jar.add(session_cookie(
        token.clone(),
        keys.ttl(),
        state.config.production,
    ));

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        jar,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Never errors: any absent/invalid session or unknown user is `user: null`.
#[instrument(skip(state, jar))]
pub async fn me(State(state): State<AppState>, jar: CookieJar) -> Json<MeResponse> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Json(MeResponse { user: None });
    };
    let Ok(user_id) = SessionKeys::from_ref(&state).verify(cookie.value()) else {
        return Json(MeResponse { user: None });
    };
    let user = User::find_by_id(&state.db, user_id)
        .await
        .ok()
        .flatten();
    Json(MeResponse {
        user: user.map(Into::into),
    })
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if payload.current_password.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Current password and new password are required".into(),
        ));
    }
    if payload.new_password.len() < PASSWORD_MIN_LEN {
        return Err(ApiError::BadRequest(format!(
            "New password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change-password wrong current password");
        return Err(ApiError::BadRequest(
            "Current password is incorrect".into(),
        ));
    }

    let new_hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user.id, &new_hash).await?;

    // Other outstanding sessions stay valid until their own expiry.
    info!(user_id = %user.id, "password updated");
    Ok(Json(SuccessResponse::with_message(
        "Password updated successfully",
    )))
}

/// Clearing the cookie is the whole logout; there is no revocation list.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    let jar = jar.add(clear_session_cookie());
    (jar, Json(SuccessResponse::ok()))
}
