/// Persisted layout: the parcel master, the append-only enforcement log, and
/// the named rate constants. Parcels are never deleted, so there is no
/// cascade anywhere; `enforcement_log.parcel_id` is a plain back-reference.
pub(super) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS parcels (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    address           TEXT NOT NULL,
    business_name     TEXT NOT NULL,
    sqft              INTEGER NOT NULL DEFAULT 0,
    pct_campus        REAL NOT NULL DEFAULT 0,
    status            TEXT NOT NULL DEFAULT 'VERIFY',
    entity_owner      TEXT,
    corporate_target  TEXT,
    past_due_balance  REAL,
    weekly_rate       REAL,
    certified_mail_tracking TEXT,
    date_packet_sent  TEXT,
    cure_deadline     TEXT,
    lien_filing_date  TEXT,
    attorney_referral_date TEXT,
    enforcement_step  TEXT NOT NULL DEFAULT 'Research',
    next_action       TEXT,
    deadline          TEXT,
    notes             TEXT,
    county_parcel_id  TEXT,
    mailing_address   TEXT,
    lender_name       TEXT,
    lender_address    TEXT,
    deed_of_trust_ref TEXT,
    lender_contact    TEXT,
    loan_number       TEXT,
    title_company     TEXT,
    address_verified  INTEGER NOT NULL DEFAULT 0,
    lender_verified   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS enforcement_log (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    parcel_id         INTEGER,
    timestamp         TEXT NOT NULL,
    action            TEXT NOT NULL,
    sent_via          TEXT,
    response_due      TEXT,
    response_received TEXT,
    next_step         TEXT,
    attorney          TEXT,
    cost              REAL NOT NULL DEFAULT 0,
    notes             TEXT,
    FOREIGN KEY (parcel_id) REFERENCES parcels(id)
);

CREATE TABLE IF NOT EXISTS rates (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    label           TEXT NOT NULL,
    value           REAL NOT NULL,
    effective_date  TEXT NOT NULL
);
";
