mod config;
mod rules;

pub use config::ScoringConfig;

use crate::analysis::domain::ClientRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stateless deterministic scorer. Identical normalized input and `now`
/// yield bit-identical output; the evaluation instant is injected so
/// recency arithmetic stays testable.
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, record: &ClientRecord, now: DateTime<Utc>) -> ScoreBreakdown {
        let components = rules::score_factors(record, now, &self.config);
        let subtotal: f64 = components.iter().map(|c| c.points).sum();

        for component in &components {
            debug!(
                client_id = %record.id,
                factor = ?component.factor,
                points = component.points,
                note = %component.notes,
                "scoring component"
            );
        }

        let sector_multiplier = self.config.sector_multiplier(record.sector.as_deref());
        let mut score = (subtotal * sector_multiplier).round();

        let inactivity_applied = !record.is_active;
        if inactivity_applied {
            score = (score * self.config.inactivity_penalty).round();
        }

        let score = score.clamp(0.0, 100.0) as u8;

        debug!(
            client_id = %record.id,
            subtotal,
            sector_multiplier,
            inactivity_applied,
            score,
            "deterministic score computed"
        );

        ScoreBreakdown {
            components,
            subtotal,
            sector_multiplier,
            inactivity_applied,
            score,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

/// Discrete contribution to the score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Budget,
    Relationship,
    Interactions,
    CompanySize,
    ProductFit,
    Opportunities,
}

/// Full arithmetic trail from factor components to the final 0-100 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub components: Vec<ScoreComponent>,
    pub subtotal: f64,
    pub sector_multiplier: f64,
    pub inactivity_applied: bool,
    pub score: u8,
}

impl ScoreBreakdown {
    /// At least one factor contributed strictly positive points. Drives
    /// the composer's no-spurious-zero invariant.
    pub fn has_positive_signal(&self) -> bool {
        self.components.iter().any(|c| c.points > 0.0)
    }

    /// Conservative floor derived from the positive components alone,
    /// used when the final score collapsed to 0 despite positive signals.
    pub fn floor_score(&self) -> u8 {
        let positive: f64 = self
            .components
            .iter()
            .filter(|c| c.points > 0.0)
            .map(|c| c.points)
            .sum();
        (positive.round() as u8).clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::{
        CompanySize, Interaction, InteractionKind, InteractionOutcome,
    };
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap()
    }

    fn record() -> ClientRecord {
        ClientRecord {
            id: "c-1".to_string(),
            name: "Scenario".to_string(),
            sector: None,
            company_size: None,
            estimated_budget: None,
            product_fit: None,
            has_worked_with_us: false,
            knows_us: false,
            contacts: Vec::new(),
            opportunities: Vec::new(),
            is_active: true,
            interactions: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn score_is_bounded_and_deterministic() {
        let engine = ScoringEngine::default();
        let mut rich = record();
        rich.estimated_budget = Some(500_000.0);
        rich.has_worked_with_us = true;
        rich.company_size = Some(CompanySize::Small);
        rich.product_fit = Some(95.0);
        rich.opportunities = vec!["a".into(), "b".into(), "c".into()];
        rich.sector = Some("Logiciels".to_string());
        rich.interactions = vec![Interaction {
            occurred_at: fixed_now() - Duration::days(1),
            kind: InteractionKind::Proposal,
            outcome: InteractionOutcome::Positive,
            notes: None,
        }];

        let first = engine.evaluate(&rich, fixed_now());
        let second = engine.evaluate(&rich, fixed_now());
        assert_eq!(first, second);
        assert!(first.score <= 100);
        assert!(first.has_positive_signal());
    }

    #[test]
    fn scenario_mid_market_software_lands_in_medium_band() {
        // budget 52152, 11-50 headcount, fit 71, one positive demo 3 days
        // old, software sector, active.
        let engine = ScoringEngine::default();
        let mut scenario = record();
        scenario.estimated_budget = Some(52_152.0);
        scenario.company_size = Some(CompanySize::Small);
        scenario.product_fit = Some(71.0);
        scenario.sector = Some("Logiciels".to_string());
        scenario.interactions = vec![Interaction {
            occurred_at: fixed_now() - Duration::days(3),
            kind: InteractionKind::Demo,
            outcome: InteractionOutcome::Positive,
            notes: None,
        }];

        let breakdown = engine.evaluate(&scenario, fixed_now());
        assert!(
            (60..=79).contains(&breakdown.score),
            "expected 60-79, got {}",
            breakdown.score
        );
    }

    #[test]
    fn history_only_record_scores_exactly_the_history_award() {
        let engine = ScoringEngine::default();
        let mut scenario = record();
        scenario.has_worked_with_us = true;

        let breakdown = engine.evaluate(&scenario, fixed_now());
        assert_eq!(breakdown.score, 25);
        assert!(breakdown.score > 0, "history bonus must never vanish");
    }

    #[test]
    fn inactivity_penalizes_after_rounding() {
        let engine = ScoringEngine::default();
        let mut scenario = record();
        scenario.estimated_budget = Some(120_000.0);
        scenario.has_worked_with_us = true;
        scenario.company_size = Some(CompanySize::Medium);
        scenario.product_fit = Some(90.0);
        scenario.opportunities = vec!["a".into(), "b".into()];
        scenario.sector = Some("Finance".to_string());

        let active = engine.evaluate(&scenario, fixed_now());
        scenario.is_active = false;
        let inactive = engine.evaluate(&scenario, fixed_now());

        let expected = ((active.score as f64) * 0.8).round() as u8;
        assert_eq!(inactive.score, expected);
        assert!(inactive.inactivity_applied);
    }

    #[test]
    fn floor_score_reflects_positive_components() {
        let engine = ScoringEngine::default();
        let mut scenario = record();
        scenario.knows_us = true;
        let breakdown = engine.evaluate(&scenario, fixed_now());
        assert_eq!(breakdown.floor_score(), 12);
    }

    #[test]
    fn empty_record_has_no_positive_signal() {
        let engine = ScoringEngine::default();
        let breakdown = engine.evaluate(&record(), fixed_now());
        assert_eq!(breakdown.score, 0);
        assert!(!breakdown.has_positive_signal());
    }
}
