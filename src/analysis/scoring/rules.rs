use super::config::ScoringConfig;
use super::{ScoreComponent, ScoreFactor};
use crate::analysis::domain::ClientRecord;
use chrono::{DateTime, Utc};

/// Evaluate the six additive factors. Each factor contributes only when
/// its signal is present and well-typed; absent signals contribute a
/// zero-point component so audits can see what was missing.
pub(crate) fn score_factors(
    record: &ClientRecord,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> Vec<ScoreComponent> {
    let mut components = Vec::with_capacity(6);

    match record.estimated_budget {
        Some(budget) => {
            let points = config.budget_points(budget);
            components.push(ScoreComponent {
                factor: ScoreFactor::Budget,
                points,
                notes: format!("estimated budget {budget:.0} maps to tier award {points:.0}"),
            });
        }
        None => components.push(ScoreComponent {
            factor: ScoreFactor::Budget,
            points: 0.0,
            notes: "no budget on record".to_string(),
        }),
    }

    let (history_points, history_note) = if record.has_worked_with_us {
        (config.worked_with_us_points, "existing customer relationship")
    } else if record.knows_us {
        (config.knows_us_points, "brand already known to client")
    } else {
        (0.0, "no prior relationship")
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::Relationship,
        points: history_points,
        notes: history_note.to_string(),
    });

    components.push(interaction_component(record, now, config));

    match record.company_size {
        Some(size) => {
            let points = config.size_points(size);
            components.push(ScoreComponent {
                factor: ScoreFactor::CompanySize,
                points,
                notes: format!("company size {} weighted to {points:.2}", size.label()),
            });
        }
        None => components.push(ScoreComponent {
            factor: ScoreFactor::CompanySize,
            points: 0.0,
            notes: "company size unknown".to_string(),
        }),
    }

    match record.product_fit {
        Some(fit) => {
            let points = config.fit_points(fit);
            components.push(ScoreComponent {
                factor: ScoreFactor::ProductFit,
                points,
                notes: format!("fit score {fit:.0} maps to tier award {points:.0}"),
            });
        }
        None => components.push(ScoreComponent {
            factor: ScoreFactor::ProductFit,
            points: 0.0,
            notes: "no fit score assigned".to_string(),
        }),
    }

    let open_opportunities = record.opportunities.len();
    let opportunity_points = match open_opportunities {
        0 => 0.0,
        1 => config.single_opportunity_points,
        _ => config.multi_opportunity_points,
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::Opportunities,
        points: opportunity_points,
        notes: format!("{open_opportunities} open opportunity(ies)"),
    });

    components
}

/// Sum outcome, weighted type, and recency points over the most recent
/// interactions, clamped to the configured cap.
fn interaction_component(
    record: &ClientRecord,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> ScoreComponent {
    let window = &record.interactions[..record.interactions.len().min(config.interaction_window)];

    if window.is_empty() {
        return ScoreComponent {
            factor: ScoreFactor::Interactions,
            points: 0.0,
            notes: "no recorded interactions".to_string(),
        };
    }

    let mut raw = 0.0;
    for interaction in window {
        let days_since = (now - interaction.occurred_at).num_days().max(0);
        raw += config.outcome_points(interaction.outcome)
            + config.kind_weight * config.kind_points(interaction.kind)
            + config.recency_bonus(days_since);
    }

    let points = raw.clamp(0.0, config.interaction_cap);
    ScoreComponent {
        factor: ScoreFactor::Interactions,
        points,
        notes: format!(
            "{} recent interaction(s), raw signal {raw:.1} clamped to {points:.1}",
            window.len()
        ),
    }
}
