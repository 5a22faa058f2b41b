use crate::analysis::domain::{CompanySize, InteractionKind, InteractionOutcome};

/// Tunable weighting tables for the deterministic scorer. The defaults
/// reproduce the production rubric; tests override individual tables to
/// exercise boundaries.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Ascending budget thresholds and their fixed point awards.
    /// Lookup, not interpolation; below the first threshold scores 0.
    pub budget_tiers: Vec<(f64, f64)>,
    /// Awarded when the client has closed business with us before.
    pub worked_with_us_points: f64,
    /// Awarded when the client merely knows us. Mutually exclusive with
    /// the previous award.
    pub knows_us_points: f64,
    /// Number of most-recent interactions examined.
    pub interaction_window: usize,
    /// Upper bound of the interaction sub-score.
    pub interaction_cap: f64,
    /// Weight applied to the interaction-type points.
    pub kind_weight: f64,
    /// Recency tiers as (max days since now, bonus points).
    pub recency_tiers: Vec<(i64, f64)>,
    /// Multiplier applied to the raw company-size points.
    pub size_weight: f64,
    /// Ascending product-fit thresholds and their awards.
    pub fit_tiers: Vec<(f64, f64)>,
    /// Bonus for more than one open opportunity.
    pub multi_opportunity_points: f64,
    /// Bonus for exactly one open opportunity.
    pub single_opportunity_points: f64,
    /// Ordered sector substrings and their multipliers; first match wins.
    pub sector_multipliers: Vec<(&'static str, f64)>,
    /// Applied to the rounded score when the account is inactive.
    pub inactivity_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            budget_tiers: vec![
                (5_000.0, 8.0),
                (20_000.0, 15.0),
                (50_000.0, 23.0),
                (100_000.0, 30.0),
            ],
            worked_with_us_points: 25.0,
            knows_us_points: 12.0,
            interaction_window: 3,
            interaction_cap: 20.0,
            kind_weight: 0.3,
            recency_tiers: vec![(7, 8.0), (30, 5.0), (90, 2.0)],
            size_weight: 0.75,
            fit_tiers: vec![(20.0, 2.0), (40.0, 5.0), (60.0, 8.0), (80.0, 10.0)],
            multi_opportunity_points: 5.0,
            single_opportunity_points: 3.0,
            sector_multipliers: vec![
                ("logiciel", 1.15),
                ("tech", 1.10),
                ("informatique", 1.10),
                ("finance", 1.10),
                ("santé", 1.05),
                ("sante", 1.05),
                ("conseil", 1.05),
                ("industrie", 0.95),
                ("commerce", 0.95),
                ("distribution", 0.95),
            ],
            inactivity_penalty: 0.8,
        }
    }
}

impl ScoringConfig {
    pub fn budget_points(&self, budget: f64) -> f64 {
        self.budget_tiers
            .iter()
            .rev()
            .find(|(threshold, _)| budget >= *threshold)
            .map(|(_, points)| *points)
            .unwrap_or(0.0)
    }

    pub fn fit_points(&self, fit: f64) -> f64 {
        self.fit_tiers
            .iter()
            .rev()
            .find(|(threshold, _)| fit >= *threshold)
            .map(|(_, points)| *points)
            .unwrap_or(0.0)
    }

    pub fn recency_bonus(&self, days_since: i64) -> f64 {
        self.recency_tiers
            .iter()
            .find(|(max_days, _)| days_since <= *max_days)
            .map(|(_, bonus)| *bonus)
            .unwrap_or(0.0)
    }

    pub fn outcome_points(&self, outcome: InteractionOutcome) -> f64 {
        match outcome {
            InteractionOutcome::Positive => 6.0,
            InteractionOutcome::Neutral => 2.0,
            InteractionOutcome::Negative => -4.0,
            InteractionOutcome::NoResponse => -2.0,
        }
    }

    pub fn kind_points(&self, kind: InteractionKind) -> f64 {
        match kind {
            InteractionKind::Proposal => 10.0,
            InteractionKind::Demo => 8.0,
            InteractionKind::Meeting => 7.0,
            InteractionKind::Call => 4.0,
            InteractionKind::FollowUp => 3.0,
            InteractionKind::Email => 2.0,
            InteractionKind::Other => 1.0,
        }
    }

    pub fn size_points(&self, size: CompanySize) -> f64 {
        let raw = match size {
            CompanySize::Micro => 12.0,
            CompanySize::Small => 20.0,
            CompanySize::Medium => 16.0,
            CompanySize::Large => 10.0,
        };
        raw * self.size_weight
    }

    /// Case-insensitive substring lookup over the ordered sector table.
    pub fn sector_multiplier(&self, sector: Option<&str>) -> f64 {
        let sector = match sector {
            Some(s) => s.to_lowercase(),
            None => return 1.0,
        };

        self.sector_multipliers
            .iter()
            .find(|(needle, _)| sector.contains(needle))
            .map(|(_, multiplier)| *multiplier)
            .unwrap_or(1.0)
    }
}
