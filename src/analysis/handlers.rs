use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{error, instrument};

use crate::{
    activity::repo::{self, ActivityKind},
    analysis::dto::{CodeReviewAnalysis, ResumeAnalysis},
    auth::session::AuthUser,
    error::ApiError,
    state::AppState,
};

/// Resumes shorter than this cannot be analyzed meaningfully.
const RESUME_MIN_CHARS: usize = 50;
/// Longer resumes are truncated to stay within provider limits.
const RESUME_MAX_CHARS: usize = 10_000;

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/code-review", post(review_code))
        .route("/resume-analysis", post(analyze_resume))
}

#[derive(Debug, Deserialize)]
pub struct CodeReviewRequest {
    #[serde(default)]
    pub code: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeAnalysisRequest {
    #[serde(default)]
    pub text: String,
}

#[instrument(skip(state, payload))]
pub async fn review_code(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CodeReviewRequest>,
) -> Result<Json<CodeReviewAnalysis>, ApiError> {
    if payload.code.trim().is_empty() {
        return Err(ApiError::BadRequest("Code is required".into()));
    }

    let analysis = state
        .analysis
        .review_code(&payload.code, payload.language.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, "code review failed");
            ApiError::Dependency("Failed to analyze code. Please try again.".into())
        })?;

    repo::record_event(
        &state.db,
        user_id,
        ActivityKind::CodeReview,
        Some(analysis.score as f64),
    )
    .await?;

    Ok(Json(analysis))
}

#[instrument(skip(state, payload))]
pub async fn analyze_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ResumeAnalysisRequest>,
) -> Result<Json<ResumeAnalysis>, ApiError> {
    let text = payload.text.trim();
    if text.chars().count() < RESUME_MIN_CHARS {
        return Err(ApiError::BadRequest(
            "Resume text is too short. Please provide the full resume content.".into(),
        ));
    }
    let text: String = text.chars().take(RESUME_MAX_CHARS).collect();

    let analysis = state.analysis.analyze_resume(&text).await.map_err(|e| {
        error!(error = %e, "resume analysis failed");
        ApiError::Dependency("Failed to analyze resume. Please try again.".into())
    })?;

    repo::record_event(
        &state.db,
        user_id,
        ActivityKind::ResumeAnalysis,
        Some(analysis.ats_score as f64),
    )
    .await?;

    Ok(Json(analysis))
}
