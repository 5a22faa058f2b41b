use super::domain::{ClientRecord, CompanySize, InteractionOutcome, RiskLevel};
use chrono::{DateTime, Duration, Utc};

/// Qualitative profile derived from raw signals, independently of the
/// numeric score. Category and priority are derived from the score
/// separately (`Category::for_score`), so a corrected score never
/// invalidates this profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalProfile {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
}

/// Apply the fixed strength/weakness rule table and the risk escalation
/// rules over the normalized record.
pub fn classify_signals(record: &ClientRecord, now: DateTime<Utc>) -> SignalProfile {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if record.has_worked_with_us {
        strengths.push("Relation commerciale déjà établie".to_string());
    } else if record.knows_us {
        strengths.push("Connaît déjà notre offre".to_string());
    }

    if record.estimated_budget.map(|b| b >= 50_000.0).unwrap_or(false) {
        strengths.push("Budget estimé élevé".to_string());
    }

    if record.product_fit.map(|fit| fit >= 80.0).unwrap_or(false) {
        strengths.push("Très forte adéquation produit".to_string());
    }

    if record.opportunities.len() > 1 {
        strengths.push("Plusieurs opportunités ouvertes".to_string());
    }

    match record.interactions.first() {
        Some(last) if last.outcome == InteractionOutcome::Positive => {
            strengths.push("Dernier échange positif".to_string());
        }
        Some(last) if last.outcome == InteractionOutcome::Negative => {
            weaknesses.push("Dernier échange négatif".to_string());
        }
        Some(_) => {}
        None => weaknesses.push("Aucun historique d'interaction".to_string()),
    }

    if record.company_size == Some(CompanySize::Micro) {
        weaknesses.push("Très petite structure".to_string());
    }

    if record.estimated_budget.is_none() {
        weaknesses.push("Budget non renseigné".to_string());
    }

    if record.product_fit.map(|fit| fit < 40.0).unwrap_or(false) {
        weaknesses.push("Adéquation produit faible".to_string());
    }

    if !record.is_active {
        weaknesses.push("Compte inactif".to_string());
    }

    let (risk_level, risk_factors) = assess_risk(record, now);

    SignalProfile {
        strengths,
        weaknesses,
        risk_level,
        risk_factors,
    }
}

/// Risk starts low. Two escalations: a majority of negative outcomes in
/// the recent window forces high; a silent quarter forces at least medium.
fn assess_risk(record: &ClientRecord, now: DateTime<Utc>) -> (RiskLevel, Vec<String>) {
    let mut level = RiskLevel::Low;
    let mut factors = Vec::new();

    let recent = record.recent_interactions();
    let negative = recent
        .iter()
        .filter(|i| i.outcome == InteractionOutcome::Negative)
        .count();
    if negative >= 2 {
        level = RiskLevel::High;
        factors.push(format!(
            "{negative} échanges négatifs sur les {} plus récents",
            recent.len()
        ));
    }

    let stale = record
        .interactions
        .first()
        .map(|last| now - last.occurred_at > Duration::days(90))
        .unwrap_or(true);
    if stale {
        if level < RiskLevel::Medium {
            level = RiskLevel::Medium;
        }
        factors.push("Aucune interaction depuis plus de 90 jours".to_string());
    }

    (level, factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::{Interaction, InteractionKind};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap()
    }

    fn record() -> ClientRecord {
        ClientRecord {
            id: "c-1".to_string(),
            name: "Profil".to_string(),
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

    fn interaction(days_ago: i64, outcome: InteractionOutcome) -> Interaction {
        Interaction {
            occurred_at: fixed_now() - Duration::days(days_ago),
            kind: InteractionKind::Call,
            outcome,
            notes: None,
        }
    }

    #[test]
    fn strengths_track_raw_signals() {
        let mut rich = record();
        rich.has_worked_with_us = true;
        rich.estimated_budget = Some(80_000.0);
        rich.product_fit = Some(85.0);
        rich.opportunities = vec!["a".into(), "b".into()];
        rich.interactions = vec![interaction(2, InteractionOutcome::Positive)];

        let profile = classify_signals(&rich, fixed_now());
        assert_eq!(profile.strengths.len(), 5);
        assert!(profile.weaknesses.is_empty());
        assert_eq!(profile.risk_level, RiskLevel::Low);
    }

    #[test]
    fn silent_quarter_escalates_to_medium() {
        let mut quiet = record();
        quiet.interactions = vec![interaction(120, InteractionOutcome::Positive)];
        let profile = classify_signals(&quiet, fixed_now());
        assert_eq!(profile.risk_level, RiskLevel::Medium);
        assert!(!profile.risk_factors.is_empty());
    }

    #[test]
    fn no_history_counts_as_stale() {
        let profile = classify_signals(&record(), fixed_now());
        assert_eq!(profile.risk_level, RiskLevel::Medium);
        assert!(profile
            .weaknesses
            .iter()
            .any(|w| w.contains("historique")));
    }

    #[test]
    fn repeated_negative_outcomes_escalate_to_high() {
        let mut sour = record();
        sour.interactions = vec![
            interaction(1, InteractionOutcome::Negative),
            interaction(4, InteractionOutcome::Negative),
            interaction(9, InteractionOutcome::Positive),
            // older negatives outside the window must not count
            interaction(200, InteractionOutcome::Negative),
        ];
        let profile = classify_signals(&sour, fixed_now());
        assert_eq!(profile.risk_level, RiskLevel::High);
    }

    #[test]
    fn single_negative_within_window_stays_low() {
        let mut record = record();
        record.interactions = vec![
            interaction(1, InteractionOutcome::Negative),
            interaction(4, InteractionOutcome::Positive),
            interaction(9, InteractionOutcome::Neutral),
        ];
        let profile = classify_signals(&record, fixed_now());
        assert_eq!(profile.risk_level, RiskLevel::Low);
    }

    #[test]
    fn inactive_account_is_a_weakness() {
        let mut dormant = record();
        dormant.is_active = false;
        let profile = classify_signals(&dormant, fixed_now());
        assert!(profile.weaknesses.iter().any(|w| w.contains("inactif")));
    }
}
