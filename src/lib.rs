//! Covenant-charge enforcement tracker for a commercial campus.
//!
//! The crate keeps the parcel master, an append-only enforcement log, and the
//! rate schedule in a single SQLite ledger, and layers pure calculation
//! (pro-rata security charges, arrears, settlement economics, escalation
//! deadlines) and read-only reports on top of it. Every mutation commits its
//! audit entry in the same transaction.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod reports;
pub mod roster;
pub mod telemetry;

pub use config::{AppConfig, CampusRates};
pub use error::{TrackerError, TrackerResult, ValidationError};
pub use ledger::{CovenantLedger, NewParcel, ParcelOrder, VerificationKind};
