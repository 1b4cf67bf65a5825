use serde::{Deserialize, Serialize};

// The provider's raw JSON is untrusted: every field is backfilled with a
// default so the rest of the system only ever sees a fully-formed shape.

fn default_score() -> i64 {
    70
}

fn default_risk() -> String {
    "low".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub line: Option<i64>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeQuality {
    #[serde(default = "default_score")]
    pub readability: i64,
    #[serde(default = "default_score")]
    pub maintainability: i64,
    #[serde(default = "default_score")]
    pub performance: i64,
    #[serde(default = "default_score")]
    pub security: i64,
}

impl Default for CodeQuality {
    fn default() -> Self {
        Self {
            readability: 70,
            maintainability: 70,
            performance: 70,
            security: 70,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAnalysis {
    #[serde(default)]
    pub vulnerabilities: Vec<String>,
    #[serde(default = "default_risk")]
    pub risk_level: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl Default for SecurityAnalysis {
    fn default() -> Self {
        Self {
            vulnerabilities: vec![],
            risk_level: default_risk(),
            recommendations: vec![],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInsights {
    #[serde(default)]
    pub slow_patterns: Vec<String>,
    #[serde(default)]
    pub optimizations: Vec<String>,
}

/// Fully-defaulted code review result returned to the client as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeReviewAnalysis {
    #[serde(default = "default_score")]
    pub score: i64,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub code_quality: CodeQuality,
    #[serde(default)]
    pub best_practices: Vec<String>,
    #[serde(default)]
    pub security_analysis: SecurityAnalysis,
    #[serde(default)]
    pub performance_insights: PerformanceInsights,
    #[serde(default)]
    pub refactoring_opportunities: Vec<String>,
}

impl CodeReviewAnalysis {
    /// Neutral analysis used when the provider output cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            score: 70,
            issues: vec![Issue {
                kind: "warning".into(),
                category: "quality".into(),
                message: "Unable to perform detailed analysis. Please try again.".into(),
                severity: "medium".into(),
                line: None,
                suggestion: None,
            }],
            suggestions: vec![
                "Ensure code is properly formatted".into(),
                "Try analyzing smaller code sections".into(),
            ],
            code_quality: CodeQuality::default(),
            best_practices: vec![
                "Follow language-specific conventions".into(),
                "Add proper error handling".into(),
            ],
            security_analysis: SecurityAnalysis {
                vulnerabilities: vec![],
                risk_level: "low".into(),
                recommendations: vec!["Review security best practices".into()],
            },
            performance_insights: PerformanceInsights {
                slow_patterns: vec![],
                optimizations: vec!["Profile code for bottlenecks".into()],
            },
            refactoring_opportunities: vec!["Break down large functions into smaller ones".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    #[serde(default)]
    pub skill: String,
    #[serde(rename = "match", default)]
    pub match_score: i64,
    #[serde(default)]
    pub demand: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Keywords {
    #[serde(default)]
    pub present: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

/// Fully-defaulted resume analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    #[serde(default = "default_score")]
    pub ats_score: i64,
    #[serde(default = "default_score")]
    pub job_match_score: i64,
    #[serde(default)]
    pub skill_matches: Vec<SkillMatch>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub keywords: Keywords,
    #[serde(default)]
    pub actionable_steps: Vec<String>,
}

impl ResumeAnalysis {
    pub fn fallback() -> Self {
        Self {
            ats_score: 70,
            job_match_score: 70,
            skill_matches: vec![
                SkillMatch {
                    skill: "Communication".into(),
                    match_score: 75,
                    demand: "high".into(),
                    category: "soft".into(),
                },
                SkillMatch {
                    skill: "Problem Solving".into(),
                    match_score: 70,
                    demand: "high".into(),
                    category: "soft".into(),
                },
            ],
            strengths: vec![
                "Resume shows relevant work experience".into(),
                "Professional formatting is present".into(),
            ],
            improvements: vec![
                "Add more quantifiable achievements with metrics".into(),
                "Include relevant keywords for ATS optimization".into(),
            ],
            keywords: Keywords {
                present: vec!["experience".into(), "education".into(), "skills".into()],
                missing: vec!["leadership".into(), "project management".into()],
            },
            actionable_steps: vec![
                "Add a professional summary section at the top of your resume".into(),
                "Quantify achievements with specific numbers and metrics".into(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_code_review_is_backfilled() {
        let analysis: CodeReviewAnalysis =
            serde_json::from_str(r#"{"score": 92, "suggestions": ["Use iterators"]}"#).unwrap();
        assert_eq!(analysis.score, 92);
        assert_eq!(analysis.suggestions, vec!["Use iterators".to_string()]);
        assert!(analysis.issues.is_empty());
        assert_eq!(analysis.code_quality.readability, 70);
        assert_eq!(analysis.security_analysis.risk_level, "low");
    }

    #[test]
    fn empty_object_yields_all_defaults() {
        let analysis: CodeReviewAnalysis = serde_json::from_str("{}").unwrap();
        assert_eq!(analysis.score, 70);
        assert_eq!(analysis.security_analysis.risk_level, "low");
        assert!(analysis.refactoring_opportunities.is_empty());
    }

    #[test]
    fn skill_match_reads_match_keyword() {
        let m: SkillMatch = serde_json::from_str(
            r#"{"skill": "Rust", "match": 88, "demand": "high", "category": "technical"}"#,
        )
        .unwrap();
        assert_eq!(m.match_score, 88);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["match"], 88);
    }

    #[test]
    fn partial_resume_is_backfilled() {
        let analysis: ResumeAnalysis =
            serde_json::from_str(r#"{"atsScore": 81, "strengths": ["Clear layout"]}"#).unwrap();
        assert_eq!(analysis.ats_score, 81);
        assert_eq!(analysis.job_match_score, 70);
        assert!(analysis.keywords.present.is_empty());
    }
}
