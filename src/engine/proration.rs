use crate::config::CampusRates;

/// Average weeks per month (365.25 / 12 / 7). The billing history was
/// produced with this truncated multiplier, so it is kept as-is rather than
/// recomputed at full precision.
pub const WEEKS_PER_MONTH: f64 = 4.333;

/// Allocate a campus-wide rate in proportion to a parcel's floor area.
/// `total_sqft` is validated positive at configuration load.
pub fn prorate(rate: f64, sqft: u32, total_sqft: u32) -> f64 {
    rate * f64::from(sqft) / f64::from(total_sqft)
}

/// Fraction of the campus this floor area represents.
pub fn campus_share(rates: &CampusRates, sqft: u32) -> f64 {
    f64::from(sqft) / f64::from(rates.total_sqft)
}

/// Weekly charge under the rate in force during the arrears window.
pub fn historic_weekly(rates: &CampusRates, sqft: u32) -> f64 {
    prorate(rates.historic_weekly_rate, sqft, rates.total_sqft)
}

/// Weekly charge under the forward-billing rate.
pub fn current_weekly(rates: &CampusRates, sqft: u32) -> f64 {
    prorate(rates.current_weekly_rate, sqft, rates.total_sqft)
}

/// Project a weekly charge onto a monthly billing cycle.
pub fn forward_monthly(weekly: f64) -> f64 {
    weekly * WEEKS_PER_MONTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proration_is_linear_in_floor_area() {
        let rates = CampusRates::default();
        let total = rates.total_sqft;
        for sqft in [0, 1, 5_000, 54_424, 300_000, total] {
            let split = current_weekly(&rates, sqft) + current_weekly(&rates, total - sqft);
            let whole = current_weekly(&rates, total);
            assert!(
                (split - whole).abs() < 1e-9,
                "share of {sqft} SF plus its complement must equal the campus rate"
            );
        }
    }

    #[test]
    fn full_campus_pays_the_full_rate() {
        let rates = CampusRates::default();
        assert_eq!(
            current_weekly(&rates, rates.total_sqft),
            rates.current_weekly_rate
        );
        assert_eq!(historic_weekly(&rates, 0), 0.0);
    }

    #[test]
    fn forward_monthly_uses_the_exact_legacy_multiplier() {
        for weekly in [0.0, 1.0, 415.67, 9_000.0] {
            assert_eq!(forward_monthly(weekly), weekly * 4.333);
        }
    }

    #[test]
    fn campus_share_matches_prorate_of_unit_rate() {
        let rates = CampusRates::default();
        let share = campus_share(&rates, 31_061);
        assert!((share - prorate(1.0, 31_061, rates.total_sqft)).abs() < 1e-15);
        assert!(share > 0.0461 && share < 0.0462);
    }
}
