use super::domain::{
    ClientRecord, CompanySize, Interaction, InteractionKind, InteractionOutcome,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::warn;

/// Outcome of a successful normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub record: ClientRecord,
    /// Interaction entries dropped for being malformed. Never fails the
    /// record as a whole.
    pub dropped_interactions: usize,
}

/// Raised only when the record is missing its identity fields; every
/// other defect is repaired or dropped locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record rejected: {reason}")]
pub struct RejectedRecord {
    pub reason: String,
}

impl RejectedRecord {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Coerce a duck-typed upstream record into a well-typed `ClientRecord`.
///
/// Referentially transparent: the same input always yields the same
/// output, and normalizing an already-normalized record is a no-op.
pub fn normalize(raw: &Value) -> Result<NormalizedRecord, RejectedRecord> {
    let id = string_field(raw, "id")
        .or_else(|| string_field(raw, "_id"))
        .ok_or_else(|| RejectedRecord::new("missing client id"))?;
    let name = string_field(raw, "name").ok_or_else(|| RejectedRecord::new("missing client name"))?;

    let sector = string_field(raw, "sector");
    let company_size = string_field(raw, "companySize").and_then(|s| CompanySize::from_raw(&s));
    let estimated_budget = number_field(raw, "estimatedBudget").filter(|b| b.is_finite() && *b >= 0.0);
    let product_fit =
        number_field(raw, "goodForCustomer").map(|fit| fit.clamp(0.0, 100.0));

    let (mut interactions, dropped_interactions) = collect_interactions(raw.get("interactions"));
    interactions.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

    let record = ClientRecord {
        id,
        name,
        sector,
        company_size,
        estimated_budget,
        product_fit,
        has_worked_with_us: bool_field(raw, "hasWorkedWithUs"),
        knows_us: bool_field(raw, "knowsUs"),
        contacts: id_list(raw.get("contacts")),
        opportunities: id_list(raw.get("opportunities")),
        is_active: bool_field(raw, "isActive"),
        interactions,
        created_at: raw
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(parse_datetime),
        updated_at: raw
            .get("updatedAt")
            .and_then(Value::as_str)
            .and_then(parse_datetime),
    };

    if dropped_interactions > 0 {
        warn!(
            client_id = %record.id,
            dropped = dropped_interactions,
            "dropped malformed interaction entries during normalization"
        );
    }

    Ok(NormalizedRecord {
        record,
        dropped_interactions,
    })
}

fn collect_interactions(raw: Option<&Value>) -> (Vec<Interaction>, usize) {
    let entries = match raw.and_then(Value::as_array) {
        Some(entries) => entries,
        None => return (Vec::new(), 0),
    };

    let mut interactions = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;

    for entry in entries {
        match parse_interaction(entry) {
            Some(interaction) => interactions.push(interaction),
            None => dropped += 1,
        }
    }

    (interactions, dropped)
}

fn parse_interaction(entry: &Value) -> Option<Interaction> {
    let occurred_at = entry.get("date").and_then(Value::as_str).and_then(parse_datetime)?;
    let kind = entry
        .get("type")
        .and_then(Value::as_str)
        .and_then(InteractionKind::from_raw)?;
    let outcome = entry
        .get("outcome")
        .and_then(Value::as_str)
        .and_then(InteractionOutcome::from_raw)?;
    let notes = entry
        .get("notes")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(Interaction {
        occurred_at,
        kind,
        outcome,
        notes,
    })
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numbers arrive either as JSON numbers or as numeric strings.
fn number_field(raw: &Value, key: &str) -> Option<f64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// `true` and `"true"` coerce to true; anything else is false.
fn bool_field(raw: &Value, key: &str) -> bool {
    match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Reference lists arrive as plain id strings or as embedded documents.
fn id_list(raw: Option<&Value>) -> Vec<String> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Object(obj) => obj
                        .get("id")
                        .or_else(|| obj.get("_id"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    None
}
