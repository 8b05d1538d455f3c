use serde::Serialize;
use tracing::warn;

/// Cost premium applied when estimating the litigation alternative.
pub const LITIGATION_PREMIUM: f64 = 1.40;

/// Economics of a proposed settlement offer. Interest is simple and
/// non-compounding, prorated by the term in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettlementResult {
    pub settled_amount: f64,
    pub monthly_no_interest: f64,
    pub total_with_interest: f64,
    pub monthly_with_interest: f64,
    pub litigation_estimate: f64,
    pub savings_vs_full: f64,
    pub savings_pct: f64,
    pub savings_vs_litigation: f64,
}

/// Compute settlement terms for a principal balance.
///
/// A zero-month term would divide by zero; the monthly figures are clamped to
/// zero instead and the clamp is reported through tracing so the operator can
/// correct the term.
pub fn settlement(
    principal: f64,
    discount_pct: f64,
    interest_rate: f64,
    term_months: u32,
) -> SettlementResult {
    let settled_amount = principal * (1.0 - discount_pct);
    let total_with_interest =
        settled_amount * (1.0 + interest_rate * (f64::from(term_months) / 12.0));

    let (monthly_no_interest, monthly_with_interest) = if term_months == 0 {
        warn!(principal, "settlement term of zero months; monthly figures clamped to zero");
        (0.0, 0.0)
    } else {
        (
            settled_amount / f64::from(term_months),
            total_with_interest / f64::from(term_months),
        )
    };

    let litigation_estimate = principal * LITIGATION_PREMIUM;

    SettlementResult {
        settled_amount,
        monthly_no_interest,
        total_with_interest,
        monthly_with_interest,
        litigation_estimate,
        savings_vs_full: principal - settled_amount,
        savings_pct: discount_pct,
        savings_vs_litigation: litigation_estimate - total_with_interest,
    }
}
