use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    activity::{
        dto::{StatsResponse, TrackRequest, TrackResponse},
        repo::{self, ActivityKind},
    },
    auth::session::AuthUser,
    error::ApiError,
    state::AppState,
};

pub fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/activity/track", post(track))
        .route("/profile/stats", get(stats))
}

#[instrument(skip(state, payload))]
pub async fn track(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TrackRequest>,
) -> Result<Json<TrackResponse>, ApiError> {
    let kind = ActivityKind::parse(&payload.kind)
        .ok_or_else(|| ApiError::BadRequest("Invalid activity type".into()))?;

    let activity = repo::record_event(&state.db, user_id, kind, payload.score).await?;

    info!(user_id = %user_id, kind = kind.as_str(), "activity tracked");
    Ok(Json(TrackResponse {
        success: true,
        activity,
    }))
}

#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let activity = repo::get(&state.db, user_id).await?;
    Ok(Json(activity.into()))
}
