//! Bulk parcel onboarding from a CSV roster export.
//!
//! Expected headers: `address`, `business_name`, `sqft`, and optionally
//! `status`, `entity_owner`, `corporate_target`, `notes`. Blank optional
//! cells are treated as absent; a blank status defaults to `VERIFY`.

use std::io::Read;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::error::{TrackerError, ValidationError};
use crate::ledger::{CovenantLedger, NewParcel};

#[derive(Debug, Error)]
pub enum RosterImportError {
    #[error("malformed roster CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: ValidationError,
    },
    #[error(transparent)]
    Ledger(#[from] TrackerError),
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    address: String,
    business_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sqft: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    entity_owner: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    corporate_target: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

impl RosterRow {
    fn into_new_parcel(self, row: usize) -> Result<NewParcel, RosterImportError> {
        let sqft = match self.sqft {
            Some(raw) => {
                let cleaned = raw.replace(',', "");
                cleaned
                    .parse::<u32>()
                    .map_err(|_| RosterImportError::Row {
                        row,
                        source: ValidationError::InvalidNumber {
                            field: "square footage",
                            value: raw,
                        },
                    })?
            }
            None => 0,
        };
        let status = match self.status {
            Some(raw) => raw
                .parse()
                .map_err(|source| RosterImportError::Row { row, source })?,
            None => NewParcel::default().status,
        };
        Ok(NewParcel {
            address: self.address.trim().to_string(),
            business_name: self.business_name.trim().to_string(),
            sqft,
            status,
            entity_owner: self.entity_owner,
            corporate_target: self.corporate_target,
            notes: self.notes,
            ..NewParcel::default()
        })
    }
}

/// Import every row of the roster, onboarding each as a parcel. Rows are
/// validated before any insert happens, so a bad row aborts the whole import
/// with nothing written. Returns the number of parcels onboarded.
pub fn import_roster<R: Read>(
    ledger: &mut CovenantLedger,
    reader: R,
) -> Result<usize, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut pending = Vec::new();
    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        // Row numbers are 1-based and skip the header.
        let row = index + 2;
        pending.push(record?.into_new_parcel(row)?);
    }

    let count = pending.len();
    for new in pending {
        ledger.insert_parcel(new)?;
    }
    info!(count, "roster import complete");
    Ok(count)
}
