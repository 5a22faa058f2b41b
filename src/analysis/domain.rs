use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-typed client record produced by the normalizer. Interactions are
/// guaranteed sorted most-recent-first. Immutable for the rest of the
/// pipeline; every downstream stage borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(
        rename = "companySize",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub company_size: Option<CompanySize>,
    #[serde(
        rename = "estimatedBudget",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_budget: Option<f64>,
    #[serde(
        rename = "goodForCustomer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub product_fit: Option<f64>,
    #[serde(rename = "hasWorkedWithUs", default)]
    pub has_worked_with_us: bool,
    #[serde(rename = "knowsUs", default)]
    pub knows_us: bool,
    #[serde(default)]
    pub contacts: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClientRecord {
    /// The window of interactions the scorer and risk rules inspect.
    pub fn recent_interactions(&self) -> &[Interaction] {
        let end = self.interactions.len().min(3);
        &self.interactions[..end]
    }
}

/// Company headcount band as recorded by the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanySize {
    #[serde(rename = "1-10")]
    Micro,
    #[serde(rename = "11-50")]
    Small,
    #[serde(rename = "51-200")]
    Medium,
    #[serde(rename = "200+")]
    Large,
}

impl CompanySize {
    pub fn from_raw(value: &str) -> Option<Self> {
        match value.trim() {
            "1-10" => Some(Self::Micro),
            "11-50" => Some(Self::Small),
            "51-200" => Some(Self::Medium),
            "200+" | "201+" => Some(Self::Large),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Micro => "1-10",
            Self::Small => "11-50",
            Self::Medium => "51-200",
            Self::Large => "200+",
        }
    }
}

/// A single recorded touch point with the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub outcome: InteractionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Call,
    Email,
    Meeting,
    Demo,
    Proposal,
    FollowUp,
    Other,
}

impl InteractionKind {
    /// Accepts the CRM's historical French and English spellings.
    pub fn from_raw(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "call" | "appel" => Some(Self::Call),
            "email" | "courriel" | "mail" => Some(Self::Email),
            "meeting" | "reunion" | "réunion" | "rendez-vous" => Some(Self::Meeting),
            "demo" | "démo" | "demonstration" | "démonstration" => Some(Self::Demo),
            "proposal" | "proposition" | "devis" => Some(Self::Proposal),
            "follow_up" | "followup" | "relance" => Some(Self::FollowUp),
            "other" | "autre" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionOutcome {
    Positive,
    Neutral,
    Negative,
    NoResponse,
}

impl InteractionOutcome {
    pub fn from_raw(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "positive" | "positif" => Some(Self::Positive),
            "neutral" | "neutre" => Some(Self::Neutral),
            "negative" | "negatif" | "négatif" => Some(Self::Negative),
            "no_response" | "sans_reponse" | "sans_réponse" => Some(Self::NoResponse),
            _ => None,
        }
    }
}

/// Priority band, a total function of the category. Canonical English
/// variants internally; French literals only on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "haute")]
    High,
    #[serde(rename = "moyenne")]
    Medium,
    #[serde(rename = "basse")]
    Low,
}

/// Category band, a total function of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "premium")]
    Premium,
    #[serde(rename = "prioritaire")]
    Prioritaire,
    #[serde(rename = "bon")]
    Bon,
    #[serde(rename = "potentiel")]
    Potentiel,
    #[serde(rename = "qualifier")]
    Qualifier,
    #[serde(rename = "révision")]
    Revision,
}

impl Category {
    pub fn for_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::Premium,
            80..=89 => Self::Prioritaire,
            70..=79 => Self::Bon,
            60..=69 => Self::Potentiel,
            50..=59 => Self::Qualifier,
            _ => Self::Revision,
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            Self::Premium | Self::Prioritaire => Priority::High,
            Self::Bon | Self::Potentiel => Priority::Medium,
            Self::Qualifier | Self::Revision => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "faible")]
    Low,
    #[serde(rename = "moyen")]
    Medium,
    #[serde(rename = "élevé")]
    High,
}

/// Structured action recommendation horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub immediate: String,
    #[serde(rename = "shortTerm")]
    pub short_term: String,
    #[serde(rename = "longTerm")]
    pub long_term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub factors: Vec<String>,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextSteps {
    pub action: String,
    pub timeframe: String,
    pub responsible: String,
    pub success_metrics: String,
}

/// Final composed analysis. The numeric trio (score, category, priority)
/// is always deterministic; textual fields may come from the completion
/// provider when enrichment succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: u8,
    pub category: Category,
    pub priority: Priority,
    pub reasoning: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Recommendations,
    #[serde(rename = "riskAssessment")]
    pub risk_assessment: RiskAssessment,
    #[serde(rename = "nextSteps")]
    pub next_steps: NextSteps,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "aiEnriched")]
    pub ai_enriched: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_bands_cover_boundaries() {
        assert_eq!(Category::for_score(100), Category::Premium);
        assert_eq!(Category::for_score(90), Category::Premium);
        assert_eq!(Category::for_score(89), Category::Prioritaire);
        assert_eq!(Category::for_score(80), Category::Prioritaire);
        assert_eq!(Category::for_score(79), Category::Bon);
        assert_eq!(Category::for_score(70), Category::Bon);
        assert_eq!(Category::for_score(69), Category::Potentiel);
        assert_eq!(Category::for_score(60), Category::Potentiel);
        assert_eq!(Category::for_score(59), Category::Qualifier);
        assert_eq!(Category::for_score(50), Category::Qualifier);
        assert_eq!(Category::for_score(49), Category::Revision);
        assert_eq!(Category::for_score(0), Category::Revision);
    }

    #[test]
    fn priority_follows_category() {
        assert_eq!(Category::Premium.priority(), Priority::High);
        assert_eq!(Category::Prioritaire.priority(), Priority::High);
        assert_eq!(Category::Bon.priority(), Priority::Medium);
        assert_eq!(Category::Potentiel.priority(), Priority::Medium);
        assert_eq!(Category::Qualifier.priority(), Priority::Low);
        assert_eq!(Category::Revision.priority(), Priority::Low);
    }

    #[test]
    fn wire_literals_are_french() {
        assert_eq!(
            serde_json::to_string(&Priority::High).expect("serializes"),
            "\"haute\""
        );
        assert_eq!(
            serde_json::to_string(&Category::Revision).expect("serializes"),
            "\"révision\""
        );
        assert_eq!(
            serde_json::to_string(&RiskLevel::High).expect("serializes"),
            "\"élevé\""
        );
    }

    #[test]
    fn interaction_enums_accept_crm_spellings() {
        assert_eq!(InteractionKind::from_raw("Démo"), Some(InteractionKind::Demo));
        assert_eq!(
            InteractionKind::from_raw("relance"),
            Some(InteractionKind::FollowUp)
        );
        assert_eq!(InteractionKind::from_raw("fax"), None);
        assert_eq!(
            InteractionOutcome::from_raw("Négatif"),
            Some(InteractionOutcome::Negative)
        );
        assert_eq!(InteractionOutcome::from_raw(""), None);
    }

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }
}
