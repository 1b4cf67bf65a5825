use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// The two tracked tool kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    CodeReview,
    ResumeAnalysis,
}

impl ActivityKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "code_review" => Some(Self::CodeReview),
            "resume_analysis" => Some(Self::ResumeAnalysis),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CodeReview => "code_review",
            Self::ResumeAnalysis => "resume_analysis",
        }
    }
}

/// One row per user; created lazily by the first tracked event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub user_id: Uuid,
    pub code_reviews_count: i64,
    pub resume_analyses_count: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_code_review_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_resume_analysis_at: Option<OffsetDateTime>,
    pub last_code_review_score: Option<f64>,
    pub last_resume_score: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

const RETURNING: &str = "RETURNING user_id, code_reviews_count, resume_analyses_count, \
     last_code_review_at, last_resume_analysis_at, last_code_review_score, last_resume_score, \
     updated_at";

/// Record one tool invocation as a single upsert: increment the kind's
/// counter, stamp its last-at, and set its last-score only when a score is
/// provided. Concurrent calls for the same user serialize at the database,
/// so no increment is ever lost.
pub async fn record_event(
    db: &PgPool,
    user_id: Uuid,
    kind: ActivityKind,
    score: Option<f64>,
) -> anyhow::Result<UserActivity> {
    let sql = match kind {
        ActivityKind::CodeReview => format!(
            r#"
            INSERT INTO user_activities
                (user_id, code_reviews_count, last_code_review_at, last_code_review_score)
            VALUES ($1, 1, now(), $2)
            ON CONFLICT (user_id) DO UPDATE SET
                code_reviews_count = user_activities.code_reviews_count + 1,
                last_code_review_at = now(),
                last_code_review_score = COALESCE($2, user_activities.last_code_review_score),
                updated_at = now()
            {RETURNING}
            "#
        ),
        ActivityKind::ResumeAnalysis => format!(
            r#"
            INSERT INTO user_activities
                (user_id, resume_analyses_count, last_resume_analysis_at, last_resume_score)
            VALUES ($1, 1, now(), $2)
            ON CONFLICT (user_id) DO UPDATE SET
                resume_analyses_count = user_activities.resume_analyses_count + 1,
                last_resume_analysis_at = now(),
                last_resume_score = COALESCE($2, user_activities.last_resume_score),
                updated_at = now()
            {RETURNING}
            "#
        ),
    };

    let activity = sqlx::query_as::<_, UserActivity>(&sql)
        .bind(user_id)
        .bind(score)
        .fetch_one(db)
        .await?;
    Ok(activity)
}

/// Fetch the activity row, if any. Callers default the fields for users
/// with no history.
pub async fn get(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserActivity>> {
    let activity = sqlx::query_as::<_, UserActivity>(
        r#"
        SELECT user_id, code_reviews_count, resume_analyses_count,
               last_code_review_at, last_resume_analysis_at,
               last_code_review_score, last_resume_score, updated_at
        FROM user_activities
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(activity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_only_known_types() {
        assert_eq!(ActivityKind::parse("code_review"), Some(ActivityKind::CodeReview));
        assert_eq!(
            ActivityKind::parse("resume_analysis"),
            Some(ActivityKind::ResumeAnalysis)
        );
        assert_eq!(ActivityKind::parse("codeReview"), None);
        assert_eq!(ActivityKind::parse(""), None);
    }

    #[test]
    fn activity_serializes_camel_case() {
        let activity = UserActivity {
            user_id: Uuid::new_v4(),
            code_reviews_count: 2,
            resume_analyses_count: 0,
            last_code_review_at: Some(OffsetDateTime::UNIX_EPOCH),
            last_resume_analysis_at: None,
            last_code_review_score: Some(85.0),
            last_resume_score: None,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["codeReviewsCount"], 2);
        assert_eq!(json["lastCodeReviewScore"], 85.0);
        assert_eq!(json["lastCodeReviewAt"], "1970-01-01T00:00:00Z");
        assert!(json["lastResumeAnalysisAt"].is_null());
    }
}
