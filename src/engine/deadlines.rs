use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::ValidationError;

// Fixed day offsets from the packet-sent date. The strict ordering
// cure < lien < attorney referral is load-bearing for the escalation path.
pub const CURE_OFFSET_DAYS: i64 = 30;
pub const LIEN_OFFSET_DAYS: i64 = 45;
pub const ATTORNEY_OFFSET_DAYS: i64 = 60;

/// The three escalation dates derived from a single packet-sent anchor.
/// Always set together; always strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeadlineSchedule {
    pub cure_deadline: NaiveDate,
    pub lien_filing_date: NaiveDate,
    pub attorney_referral_date: NaiveDate,
}

impl DeadlineSchedule {
    pub fn from_packet_sent(sent: NaiveDate) -> Self {
        Self {
            cure_deadline: sent + Duration::days(CURE_OFFSET_DAYS),
            lien_filing_date: sent + Duration::days(LIEN_OFFSET_DAYS),
            attorney_referral_date: sent + Duration::days(ATTORNEY_OFFSET_DAYS),
        }
    }
}

/// Parse an operator-supplied calendar date.
pub fn parse_packet_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.trim().to_string()))
}

/// Signed days between today and a deadline; negative once the deadline has
/// passed.
pub fn days_left(deadline: NaiveDate, today: NaiveDate) -> i64 {
    deadline.signed_duration_since(today).num_days()
}

/// Urgency tier for a deadline, derived from `days_left`. A deadline falling
/// today is urgent, not merely soon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    Urgent,
    Soon,
    Normal,
}

impl Urgency {
    pub fn classify(days_left: i64) -> Self {
        if days_left < 0 {
            Self::Overdue
        } else if days_left <= 7 {
            Self::Urgent
        } else if days_left <= 14 {
            Self::Soon
        } else {
            Self::Normal
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "OVERDUE",
            Self::Urgent => "URGENT",
            Self::Soon => "SOON",
            Self::Normal => "OK",
        }
    }
}

/// Which of the three escalation deadlines an entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineKind {
    Cure,
    LienFiling,
    AttorneyReferral,
}

impl DeadlineKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Cure, Self::LienFiling, Self::AttorneyReferral]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cure => "30-Day Cure",
            Self::LienFiling => "45-Day Lien Filing",
            Self::AttorneyReferral => "60-Day Attorney Referral",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
    }

    #[test]
    fn schedule_derives_the_fixed_offsets() {
        let schedule = DeadlineSchedule::from_packet_sent(date("2026-01-01"));
        assert_eq!(schedule.cure_deadline, date("2026-01-31"));
        assert_eq!(schedule.lien_filing_date, date("2026-02-15"));
        assert_eq!(schedule.attorney_referral_date, date("2026-03-02"));
    }

    #[test]
    fn schedule_is_strictly_increasing_for_any_anchor() {
        for anchor in ["2024-02-28", "2025-12-31", "2026-06-15"] {
            let schedule = DeadlineSchedule::from_packet_sent(date(anchor));
            assert!(schedule.cure_deadline < schedule.lien_filing_date);
            assert!(schedule.lien_filing_date < schedule.attorney_referral_date);
        }
    }

    #[test]
    fn invalid_packet_date_is_rejected() {
        assert!(matches!(
            parse_packet_date("01/15/2026"),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(parse_packet_date(" 2026-01-15 ").is_ok());
    }

    #[test]
    fn urgency_boundaries_are_inclusive_where_they_should_be() {
        assert_eq!(Urgency::classify(-1), Urgency::Overdue);
        assert_eq!(Urgency::classify(0), Urgency::Urgent);
        assert_eq!(Urgency::classify(7), Urgency::Urgent);
        assert_eq!(Urgency::classify(8), Urgency::Soon);
        assert_eq!(Urgency::classify(14), Urgency::Soon);
        assert_eq!(Urgency::classify(15), Urgency::Normal);
    }

    #[test]
    fn days_left_is_signed() {
        let today = date("2026-03-01");
        assert_eq!(days_left(date("2026-03-01"), today), 0);
        assert_eq!(days_left(date("2026-02-27"), today), -2);
        assert_eq!(days_left(date("2026-03-20"), today), 19);
    }
}
