mod http;
mod prompt;

pub use http::HttpCompletionProvider;

use super::classifier::SignalProfile;
use super::domain::ClientRecord;
use super::scoring::ScoreBreakdown;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

/// Generation bounds passed with every completion call. Low temperature
/// keeps the narrative reproducible across retries of the whole request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 700,
            temperature: 0.2,
        }
    }
}

/// Pluggable completion endpoint. Implementations must be time-bounded;
/// a timeout surfaces as an error like any other transport failure.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion transport failed: {0}")]
    Network(String),
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("completion response unusable: {0}")]
    InvalidResponse(String),
    #[error("completion call timed out")]
    Timeout,
}

/// Narrative fields the model may supply. Everything is optional; the
/// composer falls back to deterministic templates field by field. The
/// numeric score never appears here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Enrichment {
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub strengths: Option<Vec<String>>,
    #[serde(default)]
    pub weaknesses: Option<Vec<String>>,
    #[serde(default)]
    pub recommendations: Option<EnrichedRecommendations>,
    #[serde(rename = "riskAssessment", default)]
    pub risk_assessment: Option<EnrichedRisk>,
    #[serde(rename = "nextSteps", default)]
    pub next_steps: Option<EnrichedNextSteps>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrichedRecommendations {
    #[serde(default)]
    pub immediate: Option<String>,
    #[serde(rename = "shortTerm", default)]
    pub short_term: Option<String>,
    #[serde(rename = "longTerm", default)]
    pub long_term: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrichedRisk {
    #[serde(default)]
    pub factors: Option<Vec<String>>,
    #[serde(default)]
    pub mitigation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrichedNextSteps {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub success_metrics: Option<String>,
}

impl Enrichment {
    /// Drop blank strings and empty lists so the composer's fallback
    /// logic only sees genuinely usable text.
    fn sanitized(mut self) -> Self {
        self.reasoning = self.reasoning.filter(|s| !s.trim().is_empty());
        self.strengths = self.strengths.filter(|v| !v.is_empty());
        self.weaknesses = self.weaknesses.filter(|v| !v.is_empty());
        if let Some(recs) = self.recommendations.as_mut() {
            recs.immediate = recs.immediate.take().filter(|s| !s.trim().is_empty());
            recs.short_term = recs.short_term.take().filter(|s| !s.trim().is_empty());
            recs.long_term = recs.long_term.take().filter(|s| !s.trim().is_empty());
        }
        if let Some(risk) = self.risk_assessment.as_mut() {
            risk.factors = risk.factors.take().filter(|v| !v.is_empty());
            risk.mitigation = risk.mitigation.take().filter(|s| !s.trim().is_empty());
        }
        if let Some(steps) = self.next_steps.as_mut() {
            steps.action = steps.action.take().filter(|s| !s.trim().is_empty());
            steps.timeframe = steps.timeframe.take().filter(|s| !s.trim().is_empty());
            steps.responsible = steps.responsible.take().filter(|s| !s.trim().is_empty());
            steps.success_metrics = steps
                .success_metrics
                .take()
                .filter(|s| !s.trim().is_empty());
        }
        self
    }
}

/// Best-effort enrichment: one attempt, no retry, never raises. Any
/// transport or parse failure degrades to `None` with a warning and the
/// deterministic narrative takes over.
pub async fn enrich(
    provider: &dyn CompletionProvider,
    record: &ClientRecord,
    breakdown: &ScoreBreakdown,
    profile: &SignalProfile,
    options: CompletionOptions,
) -> Option<Enrichment> {
    let system_prompt = prompt::system_prompt();
    let user_prompt = prompt::user_prompt(record, breakdown, profile);

    let raw = match provider
        .complete(system_prompt, &user_prompt, options)
        .await
    {
        Ok(raw) => raw,
        Err(err) => {
            warn!(client_id = %record.id, error = %err, "AI enrichment call failed");
            return None;
        }
    };

    match parse_enrichment(&raw) {
        Some(enrichment) => Some(enrichment.sanitized()),
        None => {
            warn!(client_id = %record.id, "AI enrichment response was not parseable JSON");
            None
        }
    }
}

/// Models often wrap their JSON in prose or code fences; attempt a
/// direct parse, then fall back to the outermost brace-delimited slice.
fn parse_enrichment(raw: &str) -> Option<Enrichment> {
    let trimmed = raw.trim();
    if let Ok(enrichment) = serde_json::from_str::<Enrichment>(trimmed) {
        return Some(enrichment);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<Enrichment>(&trimmed[start..=end]).ok()
}
