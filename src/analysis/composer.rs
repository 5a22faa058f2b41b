use super::ai::Enrichment;
use super::classifier::SignalProfile;
use super::domain::{
    AnalysisResult, Category, NextSteps, Priority, Recommendations, RiskAssessment, RiskLevel,
};
use super::scoring::ScoreBreakdown;
use chrono::{DateTime, Utc};
use tracing::error;

/// Assemble the final result. Numeric fields are always deterministic;
/// textual fields prefer the enrichment when present, falling back to
/// template text over the classifier's raw findings.
///
/// Enforces the no-spurious-zero invariant: a final score of 0 with at
/// least one strictly positive component is a scoring defect, corrected
/// to a floor derived from the positive components and flagged in the
/// reasoning instead of being silently emitted.
pub fn compose(
    breakdown: &ScoreBreakdown,
    profile: &SignalProfile,
    enrichment: Option<Enrichment>,
    generated_at: DateTime<Utc>,
) -> AnalysisResult {
    let mut score = breakdown.score;
    let mut diagnostic = None;

    if score == 0 && breakdown.has_positive_signal() {
        score = breakdown.floor_score();
        error!(
            corrected_score = score,
            subtotal = breakdown.subtotal,
            "score collapsed to 0 despite positive signals; applying floor correction"
        );
        diagnostic = Some(format!(
            "[Auto-contrôle] Le calcul principal a produit 0 malgré des signaux positifs; \
             score plancher de {score} retenu. Anomalie à signaler."
        ));
    }

    let category = Category::for_score(score);
    let priority = category.priority();
    let ai_enriched = enrichment.is_some();
    let enrichment = enrichment.unwrap_or_default();

    let mut reasoning = enrichment
        .reasoning
        .unwrap_or_else(|| default_reasoning(category, score, profile));
    if let Some(note) = diagnostic {
        reasoning = format!("{note} {reasoning}");
    }

    let strengths = enrichment
        .strengths
        .unwrap_or_else(|| profile.strengths.clone());
    let weaknesses = enrichment
        .weaknesses
        .unwrap_or_else(|| profile.weaknesses.clone());

    let defaults = default_recommendations(priority);
    let (immediate, short_term, long_term) = match enrichment.recommendations {
        Some(recs) => (
            recs.immediate.unwrap_or(defaults.immediate),
            recs.short_term.unwrap_or(defaults.short_term),
            recs.long_term.unwrap_or(defaults.long_term),
        ),
        None => (defaults.immediate, defaults.short_term, defaults.long_term),
    };

    let (risk_factors, mitigation) = match enrichment.risk_assessment {
        Some(risk) => (
            risk.factors.unwrap_or_else(|| profile.risk_factors.clone()),
            risk.mitigation
                .unwrap_or_else(|| default_mitigation(profile.risk_level)),
        ),
        None => (
            profile.risk_factors.clone(),
            default_mitigation(profile.risk_level),
        ),
    };

    let default_steps = default_next_steps(priority);
    let next_steps = match enrichment.next_steps {
        Some(steps) => NextSteps {
            action: steps.action.unwrap_or(default_steps.action),
            timeframe: steps.timeframe.unwrap_or(default_steps.timeframe),
            responsible: steps.responsible.unwrap_or(default_steps.responsible),
            success_metrics: steps
                .success_metrics
                .unwrap_or(default_steps.success_metrics),
        },
        None => default_steps,
    };

    AnalysisResult {
        score,
        category,
        priority,
        reasoning,
        strengths,
        weaknesses,
        recommendations: Recommendations {
            immediate,
            short_term,
            long_term,
        },
        risk_assessment: RiskAssessment {
            level: profile.risk_level,
            factors: risk_factors,
            mitigation,
        },
        next_steps,
        generated_at,
        ai_enriched,
    }
}

/// The single recognized terminal fallback, returned when the pipeline
/// fails unexpectedly after the record was fetched.
pub fn emergency_analysis(generated_at: DateTime<Utc>) -> AnalysisResult {
    AnalysisResult {
        score: 0,
        category: Category::Revision,
        priority: Priority::Low,
        reasoning: "Analyse d'urgence: le pipeline d'évaluation a échoué de manière \
                    inattendue. Les données du client n'ont pas pu être exploitées."
            .to_string(),
        strengths: Vec::new(),
        weaknesses: vec!["Analyse automatique indisponible".to_string()],
        recommendations: Recommendations {
            immediate: "Vérifier manuellement la fiche client".to_string(),
            short_term: "Relancer l'analyse une fois l'incident résolu".to_string(),
            long_term: "Signaler l'incident à l'équipe technique".to_string(),
        },
        risk_assessment: RiskAssessment {
            level: RiskLevel::High,
            factors: vec!["Évaluation automatique en échec".to_string()],
            mitigation: "Revue manuelle du dossier par un commercial".to_string(),
        },
        next_steps: NextSteps {
            action: "Revue manuelle du dossier".to_string(),
            timeframe: "24 heures".to_string(),
            responsible: "Responsable commercial".to_string(),
            success_metrics: "Fiche client revue et score validé manuellement".to_string(),
        },
        generated_at,
        ai_enriched: false,
    }
}

fn default_reasoning(category: Category, score: u8, profile: &SignalProfile) -> String {
    let base = match category {
        Category::Premium => "Profil premium: toutes les conditions d'un engagement immédiat sont réunies.",
        Category::Prioritaire => "Client prioritaire présentant un fort potentiel de conversion.",
        Category::Bon => "Bon profil commercial, à travailler activement.",
        Category::Potentiel => "Potentiel réel mais plusieurs signaux restent à consolider.",
        Category::Qualifier => "Profil à qualifier davantage avant d'investir du temps commercial.",
        Category::Revision => "Dossier à réviser: les signaux actuels ne justifient pas de démarche active.",
    };

    let mut reasoning = format!("Score de {score}/100. {base}");
    if let Some(strength) = profile.strengths.first() {
        reasoning.push_str(&format!(" Point d'appui principal: {}.", lowercase_first(strength)));
    }
    if let Some(weakness) = profile.weaknesses.first() {
        reasoning.push_str(&format!(" Point de vigilance: {}.", lowercase_first(weakness)));
    }
    reasoning
}

fn default_recommendations(priority: Priority) -> Recommendations {
    match priority {
        Priority::High => Recommendations {
            immediate: "Contacter le client sous 48 heures".to_string(),
            short_term: "Préparer une proposition commerciale personnalisée".to_string(),
            long_term: "Construire un plan de compte pluriannuel".to_string(),
        },
        Priority::Medium => Recommendations {
            immediate: "Planifier un échange de qualification cette semaine".to_string(),
            short_term: "Organiser une démonstration ciblée".to_string(),
            long_term: "Entretenir la relation par des points réguliers".to_string(),
        },
        Priority::Low => Recommendations {
            immediate: "Compléter les informations manquantes du dossier".to_string(),
            short_term: "Inscrire le client dans une séquence de nurturing".to_string(),
            long_term: "Réévaluer le potentiel au prochain trimestre".to_string(),
        },
    }
}

fn default_mitigation(level: RiskLevel) -> String {
    match level {
        RiskLevel::Low => "Maintenir le rythme de contact actuel".to_string(),
        RiskLevel::Medium => "Reprendre contact rapidement pour réactiver la relation".to_string(),
        RiskLevel::High => {
            "Traiter les objections récentes avant toute nouvelle proposition".to_string()
        }
    }
}

fn default_next_steps(priority: Priority) -> NextSteps {
    match priority {
        Priority::High => NextSteps {
            action: "Appel de suivi avec proposition de rendez-vous".to_string(),
            timeframe: "48 heures".to_string(),
            responsible: "Commercial référent".to_string(),
            success_metrics: "Rendez-vous obtenu et prochaine étape datée".to_string(),
        },
        Priority::Medium => NextSteps {
            action: "Échange de qualification approfondie".to_string(),
            timeframe: "1 semaine".to_string(),
            responsible: "Commercial référent".to_string(),
            success_metrics: "Besoin et budget confirmés".to_string(),
        },
        Priority::Low => NextSteps {
            action: "Enrichissement du dossier client".to_string(),
            timeframe: "2 semaines".to_string(),
            responsible: "Assistant commercial".to_string(),
            success_metrics: "Fiche complétée et score recalculé".to_string(),
        },
    }
}

fn lowercase_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
