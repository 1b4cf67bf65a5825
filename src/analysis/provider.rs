use anyhow::Context;
use axum::async_trait;
use tracing::warn;

use crate::analysis::dto::{CodeReviewAnalysis, ResumeAnalysis};

/// The LLM backend is an external collaborator; handlers only see this
/// trait and its fully-defaulted result types.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn review_code(
        &self,
        code: &str,
        language: Option<&str>,
    ) -> anyhow::Result<CodeReviewAnalysis>;

    async fn analyze_resume(&self, resume_text: &str) -> anyhow::Result<ResumeAnalysis>;
}

/// Models wrap JSON in markdown fences often enough that we always strip.
pub(crate) fn strip_code_fences(raw: &str) -> String {
    raw.trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

pub(crate) fn parse_code_review(raw: &str) -> CodeReviewAnalysis {
    match serde_json::from_str(&strip_code_fences(raw)) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(error = %e, "unparseable code review output, falling back");
            CodeReviewAnalysis::fallback()
        }
    }
}

pub(crate) fn parse_resume_analysis(raw: &str) -> ResumeAnalysis {
    match serde_json::from_str(&strip_code_fences(raw)) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(error = %e, "unparseable resume analysis output, falling back");
            ResumeAnalysis::fallback()
        }
    }
}

const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Groq's OpenAI-compatible chat-completions API.
pub struct GroqProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
        }
    }

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": temperature,
            "max_tokens": 4096,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .http
            .post(GROQ_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("groq request")?
            .error_for_status()
            .context("groq status")?;

        let value: serde_json::Value = response.json().await.context("groq response body")?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        Ok(content)
    }
}

#[async_trait]
impl AnalysisProvider for GroqProvider {
    async fn review_code(
        &self,
        code: &str,
        language: Option<&str>,
    ) -> anyhow::Result<CodeReviewAnalysis> {
        let language = language.unwrap_or("code");
        let prompt = format!(
            "Review the following {language} and respond with ONLY a JSON object, no markdown, \
             shaped as: {{\"score\": <0-100>, \"issues\": [{{\"type\": \"error|warning|info\", \
             \"category\": \"bug|performance|security|quality|structure\", \"message\": \"...\", \
             \"severity\": \"high|medium|low\", \"line\": <number?>, \"suggestion\": \"...\"}}], \
             \"suggestions\": [\"...\"], \"codeQuality\": {{\"readability\": <0-100>, \
             \"maintainability\": <0-100>, \"performance\": <0-100>, \"security\": <0-100>}}, \
             \"bestPractices\": [\"...\"], \"securityAnalysis\": {{\"vulnerabilities\": [\"...\"], \
             \"riskLevel\": \"critical|high|medium|low\", \"recommendations\": [\"...\"]}}, \
             \"performanceInsights\": {{\"slowPatterns\": [\"...\"], \"optimizations\": [\"...\"]}}, \
             \"refactoringOpportunities\": [\"...\"]}}\n\nCode to review:\n```{language}\n{code}\n```"
        );
        let raw = self
            .complete(
                "You are an expert code reviewer. Return only valid JSON without any markdown.",
                &prompt,
                0.3,
            )
            .await?;
        Ok(parse_code_review(&raw))
    }

    async fn analyze_resume(&self, resume_text: &str) -> anyhow::Result<ResumeAnalysis> {
        let prompt = format!(
            "Analyze the following resume for ATS compatibility and job-market fit. Respond with \
             ONLY a JSON object, no markdown, shaped as: {{\"atsScore\": <0-100>, \
             \"jobMatchScore\": <0-100>, \"skillMatches\": [{{\"skill\": \"...\", \"match\": \
             <0-100>, \"demand\": \"high|medium|low\", \"category\": \
             \"technical|soft|tools|domain\"}}], \"strengths\": [\"...\"], \"improvements\": \
             [\"...\"], \"keywords\": {{\"present\": [\"...\"], \"missing\": [\"...\"]}}, \
             \"actionableSteps\": [\"...\"]}}\n\nResume content:\n{resume_text}"
        );
        let raw = self
            .complete(
                "You are an expert resume analyzer and career coach. Return only valid JSON \
                 without any markdown.",
                &prompt,
                0.4,
            )
            .await?;
        Ok(parse_resume_analysis(&raw))
    }
}

/// Stand-in when no API key is configured; every call fails with a
/// configuration message the handlers surface as a 500.
pub struct UnconfiguredProvider;

#[async_trait]
impl AnalysisProvider for UnconfiguredProvider {
    async fn review_code(
        &self,
        _code: &str,
        _language: Option<&str>,
    ) -> anyhow::Result<CodeReviewAnalysis> {
        anyhow::bail!("Analysis is not configured. Set GROQ_API_KEY")
    }

    async fn analyze_resume(&self, _resume_text: &str) -> anyhow::Result<ResumeAnalysis> {
        anyhow::bail!("Analysis is not configured. Set GROQ_API_KEY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let raw = "```json\n{\"score\": 80}\n```";
        assert_eq!(strip_code_fences(raw), "{\"score\": 80}");
    }

    #[test]
    fn parses_fenced_review() {
        let analysis = parse_code_review("```json\n{\"score\": 55, \"issues\": []}\n```");
        assert_eq!(analysis.score, 55);
    }

    #[test]
    fn garbage_review_falls_back() {
        let analysis = parse_code_review("Sorry, I cannot review this code.");
        assert_eq!(analysis.score, 70);
        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(analysis.issues[0].severity, "medium");
    }

    #[test]
    fn garbage_resume_falls_back() {
        let analysis = parse_resume_analysis("not json at all");
        assert_eq!(analysis.ats_score, 70);
        assert!(!analysis.skill_matches.is_empty());
    }
}
