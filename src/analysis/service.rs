use std::sync::Arc;

use super::ai::{self, CompletionOptions, CompletionProvider};
use super::classifier::classify_signals;
use super::composer;
use super::directory::{ClientDirectory, DirectoryError};
use super::domain::AnalysisResult;
use super::normalizer;
use super::scoring::{ScoringConfig, ScoringEngine};
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Orchestrates the request-scoped analysis pipeline: fetch, normalize,
/// score, classify, best-effort enrich, compose. Holds no per-request
/// state; concurrent invocations share nothing mutable.
pub struct AnalysisService<D> {
    directory: Arc<D>,
    engine: ScoringEngine,
    provider: Option<Arc<dyn CompletionProvider>>,
    completion_options: CompletionOptions,
}

impl<D> AnalysisService<D>
where
    D: ClientDirectory + 'static,
{
    pub fn new(directory: Arc<D>, config: ScoringConfig) -> Self {
        Self {
            directory,
            engine: ScoringEngine::new(config),
            provider: None,
            completion_options: CompletionOptions::default(),
        }
    }

    /// Attach a completion provider. Without one the pipeline is
    /// deterministic-only, which is a fully supported mode.
    pub fn with_provider(
        mut self,
        provider: Arc<dyn CompletionProvider>,
        options: CompletionOptions,
    ) -> Self {
        self.provider = Some(provider);
        self.completion_options = options;
        self
    }

    /// Analyze one client. Raises only for a missing id or an upstream
    /// fetch failure; every post-fetch defect degrades into a valid
    /// result, at worst the fixed emergency analysis.
    pub async fn analyze(&self, client_id: &str) -> Result<AnalysisResult, AnalysisError> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(AnalysisError::MissingClientId);
        }

        let raw = self.directory.fetch(client_id).await?;
        let now = Utc::now();
        Ok(self.analyze_fetched(client_id, &raw, now).await)
    }

    /// Post-fetch pipeline with an injectable evaluation instant. Total:
    /// always returns a well-formed result.
    pub async fn analyze_fetched(
        &self,
        client_id: &str,
        raw: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> AnalysisResult {
        let normalized = match normalizer::normalize(raw) {
            Ok(normalized) => normalized,
            Err(rejected) => {
                error!(
                    client_id = %client_id,
                    reason = %rejected.reason,
                    "record rejected by normalizer; emitting emergency analysis"
                );
                return composer::emergency_analysis(now);
            }
        };

        let record = &normalized.record;
        let breakdown = self.engine.evaluate(record, now);
        let profile = classify_signals(record, now);

        let enrichment = match &self.provider {
            Some(provider) => {
                ai::enrich(
                    provider.as_ref(),
                    record,
                    &breakdown,
                    &profile,
                    self.completion_options,
                )
                .await
            }
            None => None,
        };

        let result = composer::compose(&breakdown, &profile, enrichment, now);

        info!(
            client_id = %record.id,
            score = result.score,
            category = ?result.category,
            ai_enriched = result.ai_enriched,
            dropped_interactions = normalized.dropped_interactions,
            "client analysis composed"
        );

        result
    }
}

/// The only conditions `analyze` raises across the public boundary.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("client id must not be empty")]
    MissingClientId,
    #[error(transparent)]
    Upstream(#[from] DirectoryError),
}
