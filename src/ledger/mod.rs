mod schema;

use std::path::Path;

use chrono::{Local, NaiveDate};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::config::CampusRates;
use crate::domain::{
    ActionRecord, DeliveryChannel, EnforcementLogEntry, FieldKind, Parcel, ParcelField,
    ParcelStatus, RecommendedStep,
};
use crate::engine::deadlines::{self, DeadlineSchedule};
use crate::engine::proration;
use crate::error::{TrackerError, TrackerResult, ValidationError};

use schema::SCHEMA;

/// Ordering for parcel listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParcelOrder {
    /// Status, then identifier — the master-list view.
    #[default]
    StatusThenId,
    /// Floor area descending — the non-payer priority view.
    SqftDesc,
}

impl ParcelOrder {
    const fn clause(self) -> &'static str {
        match self {
            Self::StatusThenId => "status, id",
            Self::SqftDesc => "sqft DESC, id",
        }
    }
}

/// Attributes of a parcel being onboarded.
#[derive(Debug, Clone)]
pub struct NewParcel {
    pub address: String,
    pub business_name: String,
    pub sqft: u32,
    pub status: ParcelStatus,
    pub entity_owner: Option<String>,
    pub corporate_target: Option<String>,
    pub enforcement_step: String,
    pub next_action: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Default for NewParcel {
    fn default() -> Self {
        Self {
            address: String::new(),
            business_name: String::new(),
            sqft: 0,
            status: ParcelStatus::Verify,
            entity_owner: None,
            corporate_target: None,
            enforcement_step: RecommendedStep::Research.label().to_string(),
            next_action: None,
            deadline: None,
            notes: None,
        }
    }
}

/// A log entry joined with the parcel it refers to, for timeline views.
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub entry: EnforcementLogEntry,
    pub address: Option<String>,
    pub business_name: Option<String>,
}

/// Which research verification flag to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationKind {
    Address,
    Lender,
}

impl VerificationKind {
    const fn column(self) -> &'static str {
        match self {
            Self::Address => "address_verified",
            Self::Lender => "lender_verified",
        }
    }

    const fn log_action(self) -> &'static str {
        match self {
            Self::Address => "Address verified via county records",
            Self::Lender => "Lender of record verified via deed records",
        }
    }
}

/// A persisted rate constant.
#[derive(Debug, Clone)]
pub struct PersistedRate {
    pub label: String,
    pub value: f64,
    pub effective_date: NaiveDate,
}

/// The covenant enforcement ledger: the parcel master, the append-only
/// enforcement log, and the rate schedule, all in one SQLite file.
///
/// Every parcel mutation and its audit entry are committed in a single
/// transaction; a failed operation leaves both tables untouched. Mutating
/// methods take `&mut self` — the ledger is a single-operator tool and
/// assumes exclusive access for the duration of an operation.
pub struct CovenantLedger {
    conn: Connection,
    rates: CampusRates,
}

impl CovenantLedger {
    /// Open (creating if needed) the ledger at `path`.
    pub fn open(path: impl AsRef<Path>, rates: CampusRates) -> TrackerResult<Self> {
        let rates = rates.validated()?;
        let conn = Connection::open(path)?;
        Self::initialize(conn, rates)
    }

    /// An in-memory ledger, used by tests and dry runs.
    pub fn open_in_memory(rates: CampusRates) -> TrackerResult<Self> {
        let rates = rates.validated()?;
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn, rates)
    }

    fn initialize(mut conn: Connection, rates: CampusRates) -> TrackerResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        seed_rates(&mut conn, &rates)?;
        Ok(Self { conn, rates })
    }

    pub fn rates(&self) -> &CampusRates {
        &self.rates
    }

    /// The persisted rate schedule, in insertion order.
    pub fn rate_schedule(&self) -> TrackerResult<Vec<PersistedRate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT label, value, effective_date FROM rates ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(PersistedRate {
                label: row.get(0)?,
                value: row.get(1)?,
                effective_date: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ----- queries ---------------------------------------------------------

    pub fn get_parcel(&self, id: i64) -> TrackerResult<Parcel> {
        self.conn
            .query_row("SELECT * FROM parcels WHERE id = ?1", params![id], |row| {
                parcel_from_row(row)
            })
            .optional()?
            .ok_or(TrackerError::ParcelNotFound(id))
    }

    /// List parcels, optionally filtered by status, in a caller-chosen stable
    /// order. Repeated calls without intervening mutation return identical
    /// output.
    pub fn list_parcels(
        &self,
        filter: Option<ParcelStatus>,
        order: ParcelOrder,
    ) -> TrackerResult<Vec<Parcel>> {
        match filter {
            Some(status) => {
                let sql = format!(
                    "SELECT * FROM parcels WHERE status = ?1 ORDER BY {}",
                    order.clause()
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![status.as_str()], |row| parcel_from_row(row))?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
            }
            None => {
                let sql = format!("SELECT * FROM parcels ORDER BY {}", order.clause());
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map([], |row| parcel_from_row(row))?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
            }
        }
    }

    /// Parcels whose arrears are owed but uncollected, largest floor area
    /// first.
    pub fn nonpayers(&self) -> TrackerResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM parcels
             WHERE status IN ('DELINQUENT', 'DISPUTED', 'RECON')
             ORDER BY sqft DESC, id",
        )?;
        let rows = stmt.query_map([], |row| parcel_from_row(row))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub(crate) fn parcels_not_current(&self) -> TrackerResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM parcels WHERE status != 'CURRENT' ORDER BY sqft DESC, id",
        )?;
        let rows = stmt.query_map([], |row| parcel_from_row(row))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub(crate) fn parcels_with_packet_sent(&self) -> TrackerResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM parcels WHERE date_packet_sent IS NOT NULL ORDER BY cure_deadline, id",
        )?;
        let rows = stmt.query_map([], |row| parcel_from_row(row))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Full enforcement timeline, newest first, annotated with parcel names.
    pub fn timeline(&self) -> TrackerResult<Vec<TimelineEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT el.id, el.parcel_id, el.timestamp, el.action, el.sent_via,
                    el.response_due, el.response_received, el.next_step, el.attorney,
                    el.cost, el.notes, p.address, p.business_name
             FROM enforcement_log el
             LEFT JOIN parcels p ON el.parcel_id = p.id
             ORDER BY el.timestamp DESC, el.id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TimelineEntry {
                entry: log_entry_from_row(row)?,
                address: row.get(11)?,
                business_name: row.get(12)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Audit entries for one parcel, oldest first.
    pub fn entries_for_parcel(&self, id: i64) -> TrackerResult<Vec<EnforcementLogEntry>> {
        self.get_parcel(id)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, parcel_id, timestamp, action, sent_via, response_due,
                    response_received, next_step, attorney, cost, notes
             FROM enforcement_log WHERE parcel_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![id], |row| log_entry_from_row(row))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn log_count(&self) -> TrackerResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM enforcement_log", [], |row| row.get(0))
            .map_err(Into::into)
    }

    fn get_log_entry(&self, id: i64) -> TrackerResult<EnforcementLogEntry> {
        self.conn
            .query_row(
                "SELECT id, parcel_id, timestamp, action, sent_via, response_due,
                        response_received, next_step, attorney, cost, notes
                 FROM enforcement_log WHERE id = ?1",
                params![id],
                |row| log_entry_from_row(row),
            )
            .map_err(Into::into)
    }

    // ----- commands --------------------------------------------------------

    /// Onboard a parcel, computing its campus share and writing the
    /// onboarding audit entry in the same transaction.
    pub fn insert_parcel(&mut self, new: NewParcel) -> TrackerResult<Parcel> {
        let share = proration::campus_share(&self.rates, new.sqft);
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO parcels
                (address, business_name, sqft, pct_campus, status, entity_owner,
                 corporate_target, enforcement_step, next_action, deadline, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                new.address,
                new.business_name,
                new.sqft,
                share,
                new.status.as_str(),
                new.entity_owner,
                new.corporate_target,
                new.enforcement_step,
                new.next_action,
                new.deadline,
                new.notes,
            ],
        )?;
        let id = tx.last_insert_rowid();
        append_log(
            &tx,
            Some(id),
            &ActionRecord::new(format!("Parcel onboarded: {}", new.business_name)),
        )?;
        tx.commit()?;
        info!(parcel_id = id, business = %new.business_name, "parcel onboarded");
        self.get_parcel(id)
    }

    /// Generic mutation of a single editable attribute.
    ///
    /// The raw value is parsed and validated before the transaction opens;
    /// bad input aborts with no partial write and no audit entry. A floor
    /// area change recomputes the campus share in the same statement, and
    /// every successful update writes exactly one audit entry.
    pub fn update_field(&mut self, id: i64, field: &str, value: &str) -> TrackerResult<Parcel> {
        let field: ParcelField = field.parse()?;
        self.get_parcel(id)?;
        let write = parse_field_value(field, value, &self.rates)?;

        let tx = self.conn.transaction()?;
        match write {
            FieldWrite::Area { sqft, share } => {
                tx.execute(
                    "UPDATE parcels SET sqft = ?1, pct_campus = ?2 WHERE id = ?3",
                    params![sqft, share, id],
                )?;
            }
            FieldWrite::Value(sql_value) => {
                let sql = format!("UPDATE parcels SET {} = ?1 WHERE id = ?2", field.column());
                tx.execute(&sql, params![sql_value, id])?;
            }
        }
        append_log(
            &tx,
            Some(id),
            &ActionRecord::new(format!("Updated {} to: {}", field.label(), value.trim())),
        )?;
        tx.commit()?;
        info!(parcel_id = id, field = field.column(), "parcel field updated");
        self.get_parcel(id)
    }

    /// Record the demand packet dispatch and derive the full deadline
    /// schedule from it: cure +30d, lien filing +45d, attorney referral +60d,
    /// set atomically together with the enforcement step, plus exactly one
    /// audit entry summarizing the three dates.
    pub fn mark_packet_sent(
        &mut self,
        id: i64,
        date_sent: &str,
        tracking: Option<&str>,
    ) -> TrackerResult<DeadlineSchedule> {
        let sent = deadlines::parse_packet_date(date_sent)?;
        let parcel = self.get_parcel(id)?;
        let schedule = DeadlineSchedule::from_packet_sent(sent);

        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE parcels SET
                date_packet_sent = ?1,
                certified_mail_tracking = COALESCE(?2, certified_mail_tracking),
                cure_deadline = ?3,
                lien_filing_date = ?4,
                attorney_referral_date = ?5,
                enforcement_step = ?6,
                next_action = ?7
             WHERE id = ?8",
            params![
                sent,
                tracking,
                schedule.cure_deadline,
                schedule.lien_filing_date,
                schedule.attorney_referral_date,
                RecommendedStep::DemandSent.label(),
                format!("Await cure by {}", schedule.cure_deadline),
                id,
            ],
        )?;

        let tracking_note = tracking
            .map(|number| format!(", tracking: {number}"))
            .unwrap_or_default();
        append_log(
            &tx,
            Some(id),
            &ActionRecord {
                description: format!("Demand packet sent on {sent}{tracking_note}"),
                sent_via: Some(DeliveryChannel::UspsCertified.label().to_string()),
                response_due: Some(schedule.cure_deadline),
                next_step: Some(format!(
                    "Cure by {}, lien by {}, attorney referral by {}",
                    schedule.cure_deadline,
                    schedule.lien_filing_date,
                    schedule.attorney_referral_date
                )),
                attorney: None,
                cost: 0.0,
                notes: Some(format!(
                    "30-day cure: {} | 45-day lien: {} | 60-day attorney: {}",
                    schedule.cure_deadline,
                    schedule.lien_filing_date,
                    schedule.attorney_referral_date
                )),
            },
        )?;
        tx.commit()?;
        info!(
            parcel_id = id,
            business = %parcel.business_name,
            cure = %schedule.cure_deadline,
            "demand packet recorded"
        );
        Ok(schedule)
    }

    /// Append an enforcement action to the audit log, per-parcel or
    /// campus-wide (`parcel_id = None`).
    pub fn record_action(
        &mut self,
        parcel_id: Option<i64>,
        record: ActionRecord,
    ) -> TrackerResult<EnforcementLogEntry> {
        if record.description.trim().is_empty() {
            return Err(ValidationError::EmptyAction.into());
        }
        if let Some(id) = parcel_id {
            self.get_parcel(id)?;
        }
        let entry_id = append_log(&self.conn, parcel_id, &record)?;
        info!(parcel = ?parcel_id, action = %record.description, "enforcement action logged");
        self.get_log_entry(entry_id)
    }

    /// Set a research verification flag, with its audit entry.
    pub fn mark_verified(&mut self, id: i64, kind: VerificationKind) -> TrackerResult<()> {
        self.get_parcel(id)?;
        let tx = self.conn.transaction()?;
        let sql = format!("UPDATE parcels SET {} = 1 WHERE id = ?1", kind.column());
        tx.execute(&sql, params![id])?;
        append_log(&tx, Some(id), &ActionRecord::new(kind.log_action()))?;
        tx.commit()?;
        Ok(())
    }
}

/// Seed the persisted rate schedule on first open only. All five rows land
/// in one transaction, so later opens never mistake a partial table for a
/// seeded one.
fn seed_rates(conn: &mut Connection, rates: &CampusRates) -> TrackerResult<()> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM rates", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(());
    }
    let tx = conn.transaction()?;
    for entry in rates.rate_entries() {
        tx.execute(
            "INSERT INTO rates (label, value, effective_date) VALUES (?1, ?2, ?3)",
            params![entry.label, entry.value, entry.effective_date],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// What a parsed field update will write.
enum FieldWrite {
    /// Floor area plus the recomputed campus share.
    Area { sqft: u32, share: f64 },
    Value(SqlValue),
}

fn parse_field_value(
    field: ParcelField,
    raw: &str,
    rates: &CampusRates,
) -> Result<FieldWrite, ValidationError> {
    let trimmed = raw.trim();
    match field.kind() {
        FieldKind::Area => {
            let cleaned = trimmed.replace(',', "");
            let sqft = cleaned
                .parse::<u32>()
                .map_err(|_| ValidationError::InvalidNumber {
                    field: "square footage",
                    value: trimmed.to_string(),
                })?;
            Ok(FieldWrite::Area {
                sqft,
                share: proration::campus_share(rates, sqft),
            })
        }
        FieldKind::Money => {
            let cleaned = trimmed.replace(['$', ','], "");
            let amount = cleaned
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidNumber {
                    field: "dollar amount",
                    value: trimmed.to_string(),
                })?;
            Ok(FieldWrite::Value(SqlValue::Real(amount)))
        }
        FieldKind::Date => {
            let date = deadlines::parse_packet_date(trimmed)?;
            Ok(FieldWrite::Value(SqlValue::Text(date.to_string())))
        }
        FieldKind::Status => {
            let status: ParcelStatus = trimmed.parse()?;
            Ok(FieldWrite::Value(SqlValue::Text(status.as_str().to_string())))
        }
        FieldKind::Text => {
            if trimmed.is_empty() {
                if field.required() {
                    return Err(ValidationError::EmptyField(field.label()));
                }
                Ok(FieldWrite::Value(SqlValue::Null))
            } else {
                Ok(FieldWrite::Value(SqlValue::Text(trimmed.to_string())))
            }
        }
    }
}

/// Insert one audit entry. Callers inside a transaction pass the transaction
/// (it derefs to a connection) so the entry commits or rolls back with the
/// parcel write it belongs to.
fn append_log(
    conn: &Connection,
    parcel_id: Option<i64>,
    record: &ActionRecord,
) -> Result<i64, rusqlite::Error> {
    let now = Local::now().naive_local().format("%Y-%m-%d %H:%M:%S");
    conn.execute(
        "INSERT INTO enforcement_log
            (parcel_id, timestamp, action, sent_via, response_due,
             response_received, next_step, attorney, cost, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            parcel_id,
            now.to_string(),
            record.description,
            record.sent_via,
            record.response_due,
            None::<NaiveDate>,
            record.next_step,
            record.attorney,
            record.cost,
            record.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parcel_from_row(row: &Row<'_>) -> Result<Parcel, rusqlite::Error> {
    let status_raw: String = row.get("status")?;
    let status = status_raw.parse::<ParcelStatus>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
    })?;
    Ok(Parcel {
        id: row.get("id")?,
        address: row.get("address")?,
        business_name: row.get("business_name")?,
        sqft: row.get::<_, Option<u32>>("sqft")?.unwrap_or(0),
        pct_campus: row.get::<_, Option<f64>>("pct_campus")?.unwrap_or(0.0),
        status,
        entity_owner: row.get("entity_owner")?,
        corporate_target: row.get("corporate_target")?,
        past_due_balance: row.get("past_due_balance")?,
        weekly_rate: row.get("weekly_rate")?,
        certified_mail_tracking: row.get("certified_mail_tracking")?,
        date_packet_sent: row.get("date_packet_sent")?,
        cure_deadline: row.get("cure_deadline")?,
        lien_filing_date: row.get("lien_filing_date")?,
        attorney_referral_date: row.get("attorney_referral_date")?,
        enforcement_step: row.get("enforcement_step")?,
        next_action: row.get("next_action")?,
        deadline: row.get("deadline")?,
        notes: row.get("notes")?,
        county_parcel_id: row.get("county_parcel_id")?,
        mailing_address: row.get("mailing_address")?,
        lender_name: row.get("lender_name")?,
        lender_address: row.get("lender_address")?,
        deed_of_trust_ref: row.get("deed_of_trust_ref")?,
        lender_contact: row.get("lender_contact")?,
        loan_number: row.get("loan_number")?,
        title_company: row.get("title_company")?,
        address_verified: row.get::<_, Option<bool>>("address_verified")?.unwrap_or(false),
        lender_verified: row.get::<_, Option<bool>>("lender_verified")?.unwrap_or(false),
    })
}

/// Columns must be selected in the canonical order: id, parcel_id, timestamp,
/// action, sent_via, response_due, response_received, next_step, attorney,
/// cost, notes.
fn log_entry_from_row(row: &Row<'_>) -> Result<EnforcementLogEntry, rusqlite::Error> {
    Ok(EnforcementLogEntry {
        id: row.get(0)?,
        parcel_id: row.get(1)?,
        timestamp: row.get(2)?,
        action: row.get(3)?,
        sent_via: row.get(4)?,
        response_due: row.get(5)?,
        response_received: row.get(6)?,
        next_step: row.get(7)?,
        attorney: row.get(8)?,
        cost: row.get::<_, Option<f64>>(9)?.unwrap_or(0.0),
        notes: row.get(10)?,
    })
}
