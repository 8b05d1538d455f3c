use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// An immutable audit record. Once written it is never edited or deleted; it
/// is the permanent record of what happened and when. `parcel_id` of `None`
/// marks a campus-wide action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnforcementLogEntry {
    pub id: i64,
    pub parcel_id: Option<i64>,
    pub timestamp: NaiveDateTime,
    pub action: String,
    pub sent_via: Option<String>,
    pub response_due: Option<NaiveDate>,
    pub response_received: Option<NaiveDate>,
    pub next_step: Option<String>,
    pub attorney: Option<String>,
    pub cost: f64,
    pub notes: Option<String>,
}

/// Caller-supplied content for a new audit entry.
#[derive(Debug, Clone, Default)]
pub struct ActionRecord {
    pub description: String,
    pub sent_via: Option<String>,
    pub response_due: Option<NaiveDate>,
    pub next_step: Option<String>,
    pub attorney: Option<String>,
    pub cost: f64,
    pub notes: Option<String>,
}

impl ActionRecord {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}
