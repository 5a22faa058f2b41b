use crate::analysis::classifier::SignalProfile;
use crate::analysis::domain::ClientRecord;
use crate::analysis::scoring::ScoreBreakdown;
use std::fmt::Write;

/// Fixed instruction frame. The model only ever writes narrative; the
/// score is stated as context and explicitly off-limits.
pub(crate) fn system_prompt() -> &'static str {
    "Tu es un analyste commercial senior dans un CRM B2B. \
     On te fournit le profil d'un client et son score déjà calculé. \
     Tu rédiges uniquement le volet qualitatif en français, sans jamais \
     modifier ni recalculer le score. Réponds exclusivement avec un objet \
     JSON contenant les clés: reasoning (texte), strengths (liste), \
     weaknesses (liste), recommendations {immediate, shortTerm, longTerm}, \
     riskAssessment {factors, mitigation}, nextSteps {action, timeframe, \
     responsible, success_metrics}. Aucun texte hors du JSON."
}

/// Structured summary of the normalized record and the deterministic
/// findings, rendered as the user prompt.
pub(crate) fn user_prompt(
    record: &ClientRecord,
    breakdown: &ScoreBreakdown,
    profile: &SignalProfile,
) -> String {
    let mut prompt = String::with_capacity(512);

    let _ = writeln!(prompt, "Client: {}", record.name);
    if let Some(sector) = &record.sector {
        let _ = writeln!(prompt, "Secteur: {sector}");
    }
    if let Some(size) = record.company_size {
        let _ = writeln!(prompt, "Taille: {} employés", size.label());
    }
    if let Some(budget) = record.estimated_budget {
        let _ = writeln!(prompt, "Budget estimé: {budget:.0} EUR");
    }
    if let Some(fit) = record.product_fit {
        let _ = writeln!(prompt, "Adéquation produit: {fit:.0}/100");
    }
    let _ = writeln!(
        prompt,
        "Relation: {}",
        if record.has_worked_with_us {
            "client existant"
        } else if record.knows_us {
            "nous connaît"
        } else {
            "aucun historique"
        }
    );
    let _ = writeln!(
        prompt,
        "Compte actif: {}",
        if record.is_active { "oui" } else { "non" }
    );
    let _ = writeln!(
        prompt,
        "Opportunités ouvertes: {}",
        record.opportunities.len()
    );

    if record.interactions.is_empty() {
        let _ = writeln!(prompt, "Interactions récentes: aucune");
    } else {
        let _ = writeln!(prompt, "Interactions récentes:");
        for interaction in record.recent_interactions() {
            let _ = writeln!(
                prompt,
                "- {} {:?} ({:?})",
                interaction.occurred_at.format("%Y-%m-%d"),
                interaction.kind,
                interaction.outcome
            );
        }
    }

    let _ = writeln!(
        prompt,
        "Score déterministe: {}/100 (ne pas modifier)",
        breakdown.score
    );
    if !profile.strengths.is_empty() {
        let _ = writeln!(prompt, "Forces détectées: {}", profile.strengths.join("; "));
    }
    if !profile.weaknesses.is_empty() {
        let _ = writeln!(
            prompt,
            "Faiblesses détectées: {}",
            profile.weaknesses.join("; ")
        );
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classifier::classify_signals;
    use crate::analysis::scoring::ScoringEngine;
    use chrono::{TimeZone, Utc};

    #[test]
    fn prompt_mentions_score_and_identity() {
        let record = ClientRecord {
            id: "c-9".to_string(),
            name: "Maison Bleue".to_string(),
            sector: Some("Conseil".to_string()),
            company_size: None,
            estimated_budget: Some(30_000.0),
            product_fit: None,
            has_worked_with_us: true,
            knows_us: false,
            contacts: Vec::new(),
            opportunities: Vec::new(),
            is_active: true,
            interactions: Vec::new(),
            created_at: None,
            updated_at: None,
        };
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
        let breakdown = ScoringEngine::default().evaluate(&record, now);
        let profile = classify_signals(&record, now);

        let prompt = user_prompt(&record, &breakdown, &profile);
        assert!(prompt.contains("Maison Bleue"));
        assert!(prompt.contains(&format!("{}/100", breakdown.score)));
        assert!(prompt.contains("client existant"));
        assert!(system_prompt().contains("JSON"));
    }
}
