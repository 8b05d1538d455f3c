use crate::config::CampusRates;
use crate::domain::Parcel;

use super::proration;

/// Where a dollar figure comes from: an operator-reconciled override stored
/// on the parcel, or the pro-rata formula.
///
/// The ledger schema cannot tell a stored zero apart from "never set", so a
/// stored zero collapses to `Computed`. A parcel that genuinely owes nothing
/// is therefore representable only through its status, not through a zero
/// balance — a known ambiguity carried over from the billing history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountSource {
    Stored(f64),
    Computed,
}

impl AmountSource {
    pub fn from_stored(stored: Option<f64>) -> Self {
        match stored {
            Some(amount) if amount != 0.0 => Self::Stored(amount),
            _ => Self::Computed,
        }
    }
}

/// Accumulated unpaid obligation over the arrears lookback window. A stored
/// override always wins over the formula; otherwise only non-paying statuses
/// accrue arrears.
pub fn arrears(rates: &CampusRates, parcel: &Parcel) -> f64 {
    match AmountSource::from_stored(parcel.past_due_balance) {
        AmountSource::Stored(amount) => amount,
        AmountSource::Computed if parcel.status.is_nonpayer() => {
            proration::historic_weekly(rates, parcel.sqft) * f64::from(rates.arrears_weeks)
        }
        AmountSource::Computed => 0.0,
    }
}

/// Weekly rate billed to the parcel: the stored override when present,
/// otherwise the current pro-rata figure.
pub fn weekly_rate(rates: &CampusRates, parcel: &Parcel) -> f64 {
    match AmountSource::from_stored(parcel.weekly_rate) {
        AmountSource::Stored(amount) => amount,
        AmountSource::Computed => proration::current_weekly(rates, parcel.sqft),
    }
}

/// Forward monthly billing derived from the effective weekly rate.
pub fn forward_monthly(rates: &CampusRates, parcel: &Parcel) -> f64 {
    proration::forward_monthly(weekly_rate(rates, parcel))
}
