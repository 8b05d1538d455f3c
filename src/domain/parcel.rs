use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Enforcement status of a parcel. Exactly these six values are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParcelStatus {
    Current,
    Delinquent,
    Disputed,
    Recon,
    Verify,
    Settled,
}

impl ParcelStatus {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Current,
            Self::Delinquent,
            Self::Disputed,
            Self::Recon,
            Self::Verify,
            Self::Settled,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Delinquent => "DELINQUENT",
            Self::Disputed => "DISPUTED",
            Self::Recon => "RECON",
            Self::Verify => "VERIFY",
            Self::Settled => "SETTLED",
        }
    }

    /// Statuses whose arrears are owed but uncollected.
    pub const fn is_nonpayer(self) -> bool {
        matches!(self, Self::Delinquent | Self::Disputed | Self::Recon)
    }

    /// Design-intent transitions, surfaced for tooling. Advisory only: real
    /// disputes reopen, so the ledger never hard-blocks a move between any
    /// two statuses.
    pub const fn suggested_transitions(self) -> &'static [ParcelStatus] {
        match self {
            Self::Verify => &[Self::Current, Self::Delinquent, Self::Recon],
            Self::Delinquent => &[Self::Disputed, Self::Settled],
            Self::Disputed => &[Self::Settled, Self::Delinquent],
            Self::Recon => &[Self::Delinquent, Self::Current],
            Self::Current | Self::Settled => &[],
        }
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParcelStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CURRENT" => Ok(Self::Current),
            "DELINQUENT" => Ok(Self::Delinquent),
            "DISPUTED" => Ok(Self::Disputed),
            "RECON" => Ok(Self::Recon),
            "VERIFY" => Ok(Self::Verify),
            "SETTLED" => Ok(Self::Settled),
            _ => Err(ValidationError::UnknownStatus(value.trim().to_string())),
        }
    }
}

/// Recommended vocabulary for the free-form enforcement step. The step column
/// stays an open string; this enum exists for autocomplete and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedStep {
    Paying,
    DemandDrafted,
    DemandSent,
    ResponseReceived,
    InNegotiation,
    SettlementAgreed,
    LienFiled,
    AttorneyLetterReceived,
    Research,
    Resolved,
}

impl RecommendedStep {
    pub const fn all() -> [Self; 10] {
        [
            Self::Paying,
            Self::DemandDrafted,
            Self::DemandSent,
            Self::ResponseReceived,
            Self::InNegotiation,
            Self::SettlementAgreed,
            Self::LienFiled,
            Self::AttorneyLetterReceived,
            Self::Research,
            Self::Resolved,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Paying => "Paying",
            Self::DemandDrafted => "Demand Drafted",
            Self::DemandSent => "Demand Sent",
            Self::ResponseReceived => "Response Received",
            Self::InNegotiation => "In Negotiation",
            Self::SettlementAgreed => "Settlement Agreed",
            Self::LienFiled => "Lien Filed",
            Self::AttorneyLetterReceived => "Attorney Letter Received",
            Self::Research => "Research",
            Self::Resolved => "Resolved",
        }
    }

    /// Match free text back to the vocabulary, if it happens to fit.
    pub fn matching(text: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|step| step.label().eq_ignore_ascii_case(text.trim()))
    }
}

/// Recommended vocabulary for the delivery channel on a logged action. The
/// log column stays an open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    UspsCertified,
    Email,
    HandDelivered,
    Courier,
    Attorney,
}

impl DeliveryChannel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UspsCertified => "USPS Certified",
            Self::Email => "Email",
            Self::HandDelivered => "Hand-delivered",
            Self::Courier => "FedEx/UPS",
            Self::Attorney => "Attorney",
        }
    }
}

/// A tracked unit of campus real estate subject to covenant charges.
///
/// Parcels are never deleted; a resolved parcel is archived by moving it to
/// `SETTLED`. The campus-share fraction is recomputed whenever the floor area
/// changes, and the three enforcement deadlines are only ever set together
/// from a packet-sent date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parcel {
    pub id: i64,
    pub address: String,
    pub business_name: String,
    pub sqft: u32,
    pub pct_campus: f64,
    pub status: ParcelStatus,
    pub entity_owner: Option<String>,
    pub corporate_target: Option<String>,
    /// Reconciled past-due figure; overrides the arrears formula when set.
    pub past_due_balance: Option<f64>,
    /// Reconciled weekly rate; overrides the pro-rata formula when set.
    pub weekly_rate: Option<f64>,
    pub certified_mail_tracking: Option<String>,
    pub date_packet_sent: Option<NaiveDate>,
    pub cure_deadline: Option<NaiveDate>,
    pub lien_filing_date: Option<NaiveDate>,
    pub attorney_referral_date: Option<NaiveDate>,
    pub enforcement_step: String,
    pub next_action: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub notes: Option<String>,
    pub county_parcel_id: Option<String>,
    pub mailing_address: Option<String>,
    pub lender_name: Option<String>,
    pub lender_address: Option<String>,
    pub deed_of_trust_ref: Option<String>,
    pub lender_contact: Option<String>,
    pub loan_number: Option<String>,
    pub title_company: Option<String>,
    pub address_verified: bool,
    pub lender_verified: bool,
}

/// Editable parcel attributes addressable by `update_field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParcelField {
    Address,
    BusinessName,
    Sqft,
    Status,
    EntityOwner,
    CorporateTarget,
    PastDueBalance,
    WeeklyRate,
    EnforcementStep,
    NextAction,
    Deadline,
    Notes,
    CertifiedMailTracking,
    CountyParcelId,
    MailingAddress,
    LenderName,
    LenderAddress,
    DeedOfTrustRef,
    LenderContact,
    LoanNumber,
    TitleCompany,
}

/// How a field's raw input is parsed before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Area,
    Money,
    Date,
    Status,
}

impl ParcelField {
    pub const fn column(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::BusinessName => "business_name",
            Self::Sqft => "sqft",
            Self::Status => "status",
            Self::EntityOwner => "entity_owner",
            Self::CorporateTarget => "corporate_target",
            Self::PastDueBalance => "past_due_balance",
            Self::WeeklyRate => "weekly_rate",
            Self::EnforcementStep => "enforcement_step",
            Self::NextAction => "next_action",
            Self::Deadline => "deadline",
            Self::Notes => "notes",
            Self::CertifiedMailTracking => "certified_mail_tracking",
            Self::CountyParcelId => "county_parcel_id",
            Self::MailingAddress => "mailing_address",
            Self::LenderName => "lender_name",
            Self::LenderAddress => "lender_address",
            Self::DeedOfTrustRef => "deed_of_trust_ref",
            Self::LenderContact => "lender_contact",
            Self::LoanNumber => "loan_number",
            Self::TitleCompany => "title_company",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Address => "Address",
            Self::BusinessName => "Business Name",
            Self::Sqft => "Square Footage",
            Self::Status => "Status",
            Self::EntityOwner => "Entity/Owner",
            Self::CorporateTarget => "Corporate Target",
            Self::PastDueBalance => "Past Due Balance",
            Self::WeeklyRate => "Weekly Rate",
            Self::EnforcementStep => "Enforcement Step",
            Self::NextAction => "Next Action",
            Self::Deadline => "Deadline",
            Self::Notes => "Notes",
            Self::CertifiedMailTracking => "Certified Mail Tracking",
            Self::CountyParcelId => "County Parcel ID",
            Self::MailingAddress => "Mailing Address",
            Self::LenderName => "Lender Name",
            Self::LenderAddress => "Lender Address",
            Self::DeedOfTrustRef => "Deed of Trust Ref",
            Self::LenderContact => "Lender Contact",
            Self::LoanNumber => "Loan Number",
            Self::TitleCompany => "Title Company",
        }
    }

    /// Fields that can never be cleared; everything else blanks to unset.
    pub const fn required(self) -> bool {
        matches!(self, Self::Address | Self::BusinessName)
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Sqft => FieldKind::Area,
            Self::PastDueBalance | Self::WeeklyRate => FieldKind::Money,
            Self::Deadline => FieldKind::Date,
            Self::Status => FieldKind::Status,
            _ => FieldKind::Text,
        }
    }

    const fn all() -> [Self; 21] {
        [
            Self::Address,
            Self::BusinessName,
            Self::Sqft,
            Self::Status,
            Self::EntityOwner,
            Self::CorporateTarget,
            Self::PastDueBalance,
            Self::WeeklyRate,
            Self::EnforcementStep,
            Self::NextAction,
            Self::Deadline,
            Self::Notes,
            Self::CertifiedMailTracking,
            Self::CountyParcelId,
            Self::MailingAddress,
            Self::LenderName,
            Self::LenderAddress,
            Self::DeedOfTrustRef,
            Self::LenderContact,
            Self::LoanNumber,
            Self::TitleCompany,
        ]
    }
}

impl FromStr for ParcelField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = value.trim();
        Self::all()
            .into_iter()
            .find(|field| field.column().eq_ignore_ascii_case(name))
            .ok_or_else(|| ValidationError::UnknownField(name.to_string()))
    }
}
