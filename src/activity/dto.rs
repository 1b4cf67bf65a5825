use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::activity::repo::UserActivity;

/// Request body for `/activity/track`. The type is validated by hand so an
/// unknown value maps to a 400, not a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub success: bool,
    pub activity: UserActivity,
}

/// Stats payload; every field defaults to zero/null for a user with no
/// recorded activity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub code_reviews_count: i64,
    pub resume_analyses_count: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_code_review_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_resume_analysis_at: Option<OffsetDateTime>,
    pub last_resume_score: Option<f64>,
    pub last_code_review_score: Option<f64>,
}

impl From<Option<UserActivity>> for StatsResponse {
    fn from(activity: Option<UserActivity>) -> Self {
        match activity {
            Some(a) => Self {
                code_reviews_count: a.code_reviews_count,
                resume_analyses_count: a.resume_analyses_count,
                last_code_review_at: a.last_code_review_at,
                last_resume_analysis_at: a.last_resume_analysis_at,
                last_resume_score: a.last_resume_score,
                last_code_review_score: a.last_code_review_score,
            },
            None => Self {
                code_reviews_count: 0,
                resume_analyses_count: 0,
                last_code_review_at: None,
                last_resume_analysis_at: None,
                last_resume_score: None,
                last_code_review_score: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_to_zero_and_null() {
        let stats = StatsResponse::from(None);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["codeReviewsCount"], 0);
        assert_eq!(json["resumeAnalysesCount"], 0);
        assert!(json["lastCodeReviewAt"].is_null());
        assert!(json["lastResumeAnalysisAt"].is_null());
        assert!(json["lastResumeScore"].is_null());
        assert!(json["lastCodeReviewScore"].is_null());
    }

    #[test]
    fn track_request_reads_type_field() {
        let req: TrackRequest =
            serde_json::from_str(r#"{"type": "code_review", "score": 85}"#).unwrap();
        assert_eq!(req.kind, "code_review");
        assert_eq!(req.score, Some(85.0));
    }
}
