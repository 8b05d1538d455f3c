//! Read-only report assembly over the ledger. Each report loads the parcels
//! it needs and reduces them with the engine math; nothing here writes.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Parcel, ParcelStatus};
use crate::engine::deadlines::{self, DeadlineKind, Urgency};
use crate::engine::settlement::{self, SettlementResult};
use crate::engine::{arrears, proration};
use crate::error::TrackerResult;
use crate::ledger::CovenantLedger;

/// Full financial picture of one parcel.
#[derive(Debug, Clone, Serialize)]
pub struct ParcelFigures {
    pub parcel_id: i64,
    pub business_name: String,
    pub sqft: u32,
    pub campus_share: f64,
    pub historic_weekly: f64,
    pub current_weekly: f64,
    pub effective_weekly: f64,
    pub forward_monthly: f64,
    pub arrears: f64,
}

/// One line of the pro-rata reconciliation table.
///
/// `billed_weekly` is the raw stored rate (zero when none was ever recorded),
/// not the formula fallback — the point of the table is to surface the gap
/// between what the formula says and what is actually being billed.
#[derive(Debug, Clone, Serialize)]
pub struct ProRataRow {
    pub parcel_id: i64,
    pub address: String,
    pub business_name: String,
    pub status: ParcelStatus,
    pub sqft: u32,
    pub campus_share: f64,
    pub prorata_weekly: f64,
    pub billed_weekly: f64,
    /// Signed: positive means under-billed relative to pro-rata.
    pub variance_weekly: f64,
    pub prorata_monthly: f64,
    pub billed_monthly: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProRataTable {
    pub rows: Vec<ProRataRow>,
    pub total_sqft: u64,
    pub total_prorata_weekly: f64,
    pub total_billed_weekly: f64,
    pub total_variance_weekly: f64,
    pub total_prorata_monthly: f64,
    pub total_billed_monthly: f64,
}

impl ProRataTable {
    /// The weekly billing gap projected over a year.
    pub fn annual_variance(&self) -> f64 {
        self.total_variance_weekly * 52.0
    }
}

/// A single dated obligation in the deadline feed.
#[derive(Debug, Clone, Serialize)]
pub struct DeadlineEntry {
    pub parcel_id: i64,
    pub business_name: String,
    pub address: String,
    pub kind: DeadlineKind,
    pub date: NaiveDate,
    pub days_left: i64,
    pub urgency: Urgency,
}

/// Every escalation deadline across the campus, soonest first.
#[derive(Debug, Clone, Serialize)]
pub struct DeadlineFeed {
    pub entries: Vec<DeadlineEntry>,
    pub overdue: usize,
    pub urgent: usize,
    pub soon: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusCount {
    pub status: ParcelStatus,
    pub count: usize,
    pub sqft: u64,
    pub arrears: f64,
}

/// A non-payer ranked by exposure.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityEntry {
    pub parcel_id: i64,
    pub business_name: String,
    pub status: ParcelStatus,
    pub sqft: u32,
    pub arrears: f64,
    pub forward_monthly: f64,
    pub enforcement_step: String,
}

/// Campaign-level rollup: per-status tallies, campus exposure, and the
/// priority worklist of unresolved parcels sorted by arrears.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub by_status: Vec<StatusCount>,
    pub parcel_count: usize,
    pub needs_research: usize,
    pub total_arrears: f64,
    pub total_forward_monthly: f64,
    pub nonpayer_sqft: u64,
    pub priority: Vec<PriorityEntry>,
}

/// An unresolved parcel's research state for the title/lender workup queue.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchRow {
    pub parcel_id: i64,
    pub business_name: String,
    pub address: String,
    pub status: ParcelStatus,
    pub sqft: u32,
    pub county_parcel_id: Option<String>,
    pub lender_name: Option<String>,
    pub title_company: Option<String>,
    pub address_verified: bool,
    pub lender_verified: bool,
}

impl ResearchRow {
    /// Both flags set: the parcel is ready for a demand packet.
    pub fn fully_verified(&self) -> bool {
        self.address_verified && self.lender_verified
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchQueue {
    pub rows: Vec<ResearchRow>,
    pub fully_verified: usize,
    pub pending: usize,
}

impl CovenantLedger {
    pub fn figures(&self, id: i64) -> TrackerResult<ParcelFigures> {
        let parcel = self.get_parcel(id)?;
        let rates = self.rates();
        Ok(ParcelFigures {
            parcel_id: parcel.id,
            business_name: parcel.business_name.clone(),
            sqft: parcel.sqft,
            campus_share: proration::campus_share(rates, parcel.sqft),
            historic_weekly: proration::historic_weekly(rates, parcel.sqft),
            current_weekly: proration::current_weekly(rates, parcel.sqft),
            effective_weekly: arrears::weekly_rate(rates, &parcel),
            forward_monthly: arrears::forward_monthly(rates, &parcel),
            arrears: arrears::arrears(rates, &parcel),
        })
    }

    /// Settlement economics for a parcel, with its computed arrears as the
    /// principal.
    pub fn settlement_for_parcel(
        &self,
        id: i64,
        discount_pct: f64,
        interest_rate: f64,
        term_months: u32,
    ) -> TrackerResult<SettlementResult> {
        let parcel = self.get_parcel(id)?;
        let principal = arrears::arrears(self.rates(), &parcel);
        Ok(settlement::settlement(
            principal,
            discount_pct,
            interest_rate,
            term_months,
        ))
    }

    /// Pro-rata reconciliation over the delinquent parcels, largest floor
    /// area first. Parcels in any other status are outside the recovery
    /// campaign and stay out of the totals.
    pub fn pro_rata_table(&self) -> TrackerResult<ProRataTable> {
        let parcels = self.list_parcels(
            Some(ParcelStatus::Delinquent),
            crate::ledger::ParcelOrder::SqftDesc,
        )?;
        let rates = self.rates();

        let rows: Vec<ProRataRow> = parcels
            .iter()
            .map(|parcel| {
                let prorata_weekly = proration::current_weekly(rates, parcel.sqft);
                let billed_weekly = parcel.weekly_rate.unwrap_or(0.0);
                ProRataRow {
                    parcel_id: parcel.id,
                    address: parcel.address.clone(),
                    business_name: parcel.business_name.clone(),
                    status: parcel.status,
                    sqft: parcel.sqft,
                    campus_share: proration::campus_share(rates, parcel.sqft),
                    prorata_weekly,
                    billed_weekly,
                    variance_weekly: prorata_weekly - billed_weekly,
                    prorata_monthly: proration::forward_monthly(prorata_weekly),
                    billed_monthly: proration::forward_monthly(billed_weekly),
                }
            })
            .collect();

        Ok(ProRataTable {
            total_sqft: rows.iter().map(|row| u64::from(row.sqft)).sum(),
            total_prorata_weekly: rows.iter().map(|row| row.prorata_weekly).sum(),
            total_billed_weekly: rows.iter().map(|row| row.billed_weekly).sum(),
            total_variance_weekly: rows.iter().map(|row| row.variance_weekly).sum(),
            total_prorata_monthly: rows.iter().map(|row| row.prorata_monthly).sum(),
            total_billed_monthly: rows.iter().map(|row| row.billed_monthly).sum(),
            rows,
        })
    }

    /// All escalation deadlines for parcels whose packet has gone out,
    /// classified against `today` and sorted soonest first.
    pub fn upcoming_deadlines(&self, today: NaiveDate) -> TrackerResult<DeadlineFeed> {
        let parcels = self.parcels_with_packet_sent()?;
        let mut entries = Vec::new();
        for parcel in &parcels {
            for (kind, date) in deadline_dates(parcel) {
                let days = deadlines::days_left(date, today);
                entries.push(DeadlineEntry {
                    parcel_id: parcel.id,
                    business_name: parcel.business_name.clone(),
                    address: parcel.address.clone(),
                    kind,
                    date,
                    days_left: days,
                    urgency: Urgency::classify(days),
                });
            }
        }
        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.parcel_id.cmp(&b.parcel_id)));

        let tally = |wanted: Urgency| entries.iter().filter(|e| e.urgency == wanted).count();
        Ok(DeadlineFeed {
            overdue: tally(Urgency::Overdue),
            urgent: tally(Urgency::Urgent),
            soon: tally(Urgency::Soon),
            entries,
        })
    }

    pub fn campaign_summary(&self) -> TrackerResult<CampaignSummary> {
        let parcels = self.list_parcels(None, crate::ledger::ParcelOrder::StatusThenId)?;
        let rates = self.rates();

        let by_status: Vec<StatusCount> = ParcelStatus::ordered()
            .into_iter()
            .map(|status| {
                let matching = parcels.iter().filter(|p| p.status == status);
                StatusCount {
                    status,
                    count: matching.clone().count(),
                    sqft: matching.clone().map(|p| u64::from(p.sqft)).sum(),
                    arrears: matching.map(|p| arrears::arrears(rates, p)).sum(),
                }
            })
            .collect();

        let needs_research = parcels
            .iter()
            .filter(|p| matches!(p.status, ParcelStatus::Recon | ParcelStatus::Verify))
            .count();

        let mut priority: Vec<PriorityEntry> = parcels
            .iter()
            .filter(|p| p.status != ParcelStatus::Current)
            .map(|p| PriorityEntry {
                parcel_id: p.id,
                business_name: p.business_name.clone(),
                status: p.status,
                sqft: p.sqft,
                arrears: arrears::arrears(rates, p),
                forward_monthly: arrears::forward_monthly(rates, p),
                enforcement_step: p.enforcement_step.clone(),
            })
            .collect();
        priority.sort_by(|a, b| b.arrears.total_cmp(&a.arrears));

        Ok(CampaignSummary {
            parcel_count: parcels.len(),
            needs_research,
            total_arrears: parcels.iter().map(|p| arrears::arrears(rates, p)).sum(),
            total_forward_monthly: parcels
                .iter()
                .filter(|p| p.status != ParcelStatus::Settled)
                .map(|p| arrears::forward_monthly(rates, p))
                .sum(),
            nonpayer_sqft: parcels
                .iter()
                .filter(|p| p.status.is_nonpayer())
                .map(|p| u64::from(p.sqft))
                .sum(),
            by_status,
            priority,
        })
    }

    /// Title and lender workup queue: every unresolved parcel, largest floor
    /// area first, with its verification flags.
    pub fn research_queue(&self) -> TrackerResult<ResearchQueue> {
        let parcels = self.parcels_not_current()?;
        let rows: Vec<ResearchRow> = parcels
            .into_iter()
            .map(|p| ResearchRow {
                parcel_id: p.id,
                business_name: p.business_name,
                address: p.address,
                status: p.status,
                sqft: p.sqft,
                county_parcel_id: p.county_parcel_id,
                lender_name: p.lender_name,
                title_company: p.title_company,
                address_verified: p.address_verified,
                lender_verified: p.lender_verified,
            })
            .collect();

        let fully_verified = rows.iter().filter(|row| row.fully_verified()).count();
        Ok(ResearchQueue {
            pending: rows.len() - fully_verified,
            fully_verified,
            rows,
        })
    }
}

fn deadline_dates(parcel: &Parcel) -> Vec<(DeadlineKind, NaiveDate)> {
    let mut dates = Vec::with_capacity(3);
    if let Some(date) = parcel.cure_deadline {
        dates.push((DeadlineKind::Cure, date));
    }
    if let Some(date) = parcel.lien_filing_date {
        dates.push((DeadlineKind::LienFiling, date));
    }
    if let Some(date) = parcel.attorney_referral_date {
        dates.push((DeadlineKind::AttorneyReferral, date));
    }
    dates
}
