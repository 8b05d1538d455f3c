use chrono::NaiveDate;
use covenant_tracker::domain::{ActionRecord, ParcelStatus};
use covenant_tracker::{
    CampusRates, CovenantLedger, NewParcel, ParcelOrder, TrackerError, ValidationError,
    VerificationKind,
};

fn ledger() -> CovenantLedger {
    CovenantLedger::open_in_memory(CampusRates::default()).expect("in-memory ledger opens")
}

fn seeded_ledger() -> CovenantLedger {
    let mut ledger = ledger();
    for (address, business, sqft, status) in [
        ("6480 Quince Rd", "Pointe at Kirby", 31_061, ParcelStatus::Delinquent),
        ("6524 Quince Rd", "Kirby Animal Hospital", 9_964, ParcelStatus::Current),
        ("6560 Quince Rd", "Gateway Storage", 54_424, ParcelStatus::Disputed),
        ("6600 Quince Rd", "Quince Dental Group", 4_200, ParcelStatus::Verify),
    ] {
        ledger
            .insert_parcel(NewParcel {
                address: address.to_string(),
                business_name: business.to_string(),
                sqft,
                status,
                ..NewParcel::default()
            })
            .expect("seed parcel inserts");
    }
    ledger
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

#[test]
fn onboarding_computes_campus_share_and_logs_once() {
    let mut ledger = ledger();
    let parcel = ledger
        .insert_parcel(NewParcel {
            address: "6480 Quince Rd".to_string(),
            business_name: "Pointe at Kirby".to_string(),
            sqft: 31_061,
            status: ParcelStatus::Delinquent,
            ..NewParcel::default()
        })
        .expect("parcel inserts");

    assert!((parcel.pct_campus - 31_061.0 / 672_718.0).abs() < 1e-12);
    assert_eq!(parcel.status, ParcelStatus::Delinquent);
    assert_eq!(ledger.log_count().expect("log count"), 1);

    let entries = ledger
        .entries_for_parcel(parcel.id)
        .expect("entries load");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "Parcel onboarded: Pointe at Kirby");
}

#[test]
fn packet_sent_derives_the_three_deadlines_atomically() {
    let mut ledger = seeded_ledger();
    let before = ledger.log_count().expect("log count");

    let schedule = ledger
        .mark_packet_sent(1, "2026-01-01", Some("9407 1000 0000 0000 0001"))
        .expect("packet recorded");

    assert_eq!(schedule.cure_deadline, date("2026-01-31"));
    assert_eq!(schedule.lien_filing_date, date("2026-02-15"));
    assert_eq!(schedule.attorney_referral_date, date("2026-03-02"));

    let parcel = ledger.get_parcel(1).expect("parcel reloads");
    assert_eq!(parcel.date_packet_sent, Some(date("2026-01-01")));
    assert_eq!(parcel.cure_deadline, Some(schedule.cure_deadline));
    assert_eq!(parcel.lien_filing_date, Some(schedule.lien_filing_date));
    assert_eq!(
        parcel.attorney_referral_date,
        Some(schedule.attorney_referral_date)
    );
    assert_eq!(parcel.enforcement_step, "Demand Sent");
    assert_eq!(
        parcel.certified_mail_tracking.as_deref(),
        Some("9407 1000 0000 0000 0001")
    );
    assert_eq!(
        parcel.next_action.as_deref(),
        Some("Await cure by 2026-01-31")
    );

    // Exactly one audit entry for the whole packet operation.
    assert_eq!(ledger.log_count().expect("log count"), before + 1);
    let entries = ledger.entries_for_parcel(1).expect("entries load");
    let last = entries.last().expect("packet entry present");
    assert!(last.action.starts_with("Demand packet sent on 2026-01-01"));
    assert!(last.action.contains("9407 1000 0000 0000 0001"));
    assert_eq!(last.sent_via.as_deref(), Some("USPS Certified"));
    assert_eq!(last.response_due, Some(schedule.cure_deadline));
}

#[test]
fn bad_packet_date_writes_nothing() {
    let mut ledger = seeded_ledger();
    let before = ledger.log_count().expect("log count");

    let result = ledger.mark_packet_sent(1, "01/15/2026", None);
    assert!(matches!(
        result,
        Err(TrackerError::Validation(ValidationError::InvalidDate(_)))
    ));

    let parcel = ledger.get_parcel(1).expect("parcel reloads");
    assert!(parcel.date_packet_sent.is_none());
    assert!(parcel.cure_deadline.is_none());
    assert_eq!(ledger.log_count().expect("log count"), before);
}

#[test]
fn update_field_rejects_bad_numeric_input_without_partial_writes() {
    let mut ledger = seeded_ledger();
    let before_parcel = ledger.get_parcel(1).expect("parcel loads");
    let before_count = ledger.log_count().expect("log count");

    let result = ledger.update_field(1, "past_due_balance", "a lot");
    assert!(matches!(
        result,
        Err(TrackerError::Validation(ValidationError::InvalidNumber { .. }))
    ));

    assert_eq!(ledger.get_parcel(1).expect("parcel reloads"), before_parcel);
    assert_eq!(ledger.log_count().expect("log count"), before_count);
}

#[test]
fn update_field_accepts_currency_formatting_and_logs() {
    let mut ledger = seeded_ledger();
    let parcel = ledger
        .update_field(1, "past_due_balance", "$43,788.12")
        .expect("money field updates");
    assert_eq!(parcel.past_due_balance, Some(43_788.12));

    let entries = ledger.entries_for_parcel(1).expect("entries load");
    let last = entries.last().expect("update entry present");
    assert_eq!(last.action, "Updated Past Due Balance to: $43,788.12");
}

#[test]
fn sqft_update_recomputes_campus_share_in_the_same_write() {
    let mut ledger = seeded_ledger();
    let parcel = ledger
        .update_field(2, "sqft", "12,000")
        .expect("area field updates");
    assert_eq!(parcel.sqft, 12_000);
    assert!((parcel.pct_campus - 12_000.0 / 672_718.0).abs() < 1e-12);
}

#[test]
fn unknown_field_and_status_are_rejected() {
    let mut ledger = seeded_ledger();

    assert!(matches!(
        ledger.update_field(1, "zoning_code", "C-2"),
        Err(TrackerError::Validation(ValidationError::UnknownField(_)))
    ));
    assert!(matches!(
        ledger.update_field(1, "status", "FORECLOSED"),
        Err(TrackerError::Validation(ValidationError::UnknownStatus(_)))
    ));

    let parcel = ledger
        .update_field(1, "status", "settled")
        .expect("case-insensitive status accepted");
    assert_eq!(parcel.status, ParcelStatus::Settled);
}

#[test]
fn required_fields_cannot_be_cleared_but_optional_ones_can() {
    let mut ledger = seeded_ledger();
    let before_parcel = ledger.get_parcel(1).expect("parcel loads");
    let before_count = ledger.log_count().expect("log count");

    for field in ["address", "business_name"] {
        let result = ledger.update_field(1, field, "   ");
        assert!(matches!(
            result,
            Err(TrackerError::Validation(ValidationError::EmptyField(_)))
        ));
    }
    assert_eq!(ledger.get_parcel(1).expect("parcel reloads"), before_parcel);
    assert_eq!(ledger.log_count().expect("log count"), before_count);

    // Optional text fields blank back to unset.
    ledger
        .update_field(1, "notes", "follow up next week")
        .expect("notes set");
    let cleared = ledger.update_field(1, "notes", "").expect("notes clear");
    assert_eq!(cleared.notes, None);
}

#[test]
fn missing_parcel_is_reported_before_anything_is_written() {
    let mut ledger = seeded_ledger();
    let before = ledger.log_count().expect("log count");

    assert!(matches!(
        ledger.get_parcel(99),
        Err(TrackerError::ParcelNotFound(99))
    ));
    assert!(matches!(
        ledger.update_field(99, "notes", "ghost"),
        Err(TrackerError::ParcelNotFound(99))
    ));
    assert!(matches!(
        ledger.mark_packet_sent(99, "2026-01-01", None),
        Err(TrackerError::ParcelNotFound(99))
    ));
    assert_eq!(ledger.log_count().expect("log count"), before);
}

#[test]
fn listing_is_stable_and_honors_filter_and_order() {
    let ledger = seeded_ledger();

    let first = ledger
        .list_parcels(None, ParcelOrder::StatusThenId)
        .expect("list loads");
    let second = ledger
        .list_parcels(None, ParcelOrder::StatusThenId)
        .expect("list loads again");
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);

    let delinquent = ledger
        .list_parcels(Some(ParcelStatus::Delinquent), ParcelOrder::StatusThenId)
        .expect("filtered list loads");
    assert_eq!(delinquent.len(), 1);
    assert_eq!(delinquent[0].business_name, "Pointe at Kirby");

    let by_size = ledger
        .list_parcels(None, ParcelOrder::SqftDesc)
        .expect("sized list loads");
    let areas: Vec<u32> = by_size.iter().map(|p| p.sqft).collect();
    assert_eq!(areas, vec![54_424, 31_061, 9_964, 4_200]);
}

#[test]
fn nonpayers_excludes_current_verify_and_settled() {
    let ledger = seeded_ledger();
    let nonpayers = ledger.nonpayers().expect("nonpayers load");
    let names: Vec<&str> = nonpayers.iter().map(|p| p.business_name.as_str()).collect();
    assert_eq!(names, vec!["Gateway Storage", "Pointe at Kirby"]);
}

#[test]
fn campus_wide_actions_need_no_parcel_but_empty_actions_are_rejected() {
    let mut ledger = seeded_ledger();

    let entry = ledger
        .record_action(None, ActionRecord::new("Annual assessment notice mailed to all parcels"))
        .expect("campus-wide action records");
    assert_eq!(entry.parcel_id, None);

    assert!(matches!(
        ledger.record_action(Some(1), ActionRecord::new("   ")),
        Err(TrackerError::Validation(ValidationError::EmptyAction))
    ));
    assert!(matches!(
        ledger.record_action(Some(99), ActionRecord::new("Call owner")),
        Err(TrackerError::ParcelNotFound(99))
    ));
}

#[test]
fn timeline_joins_parcel_names_and_runs_newest_first() {
    let mut ledger = seeded_ledger();
    ledger
        .record_action(None, ActionRecord::new("Campaign kickoff"))
        .expect("campus action records");

    let timeline = ledger.timeline().expect("timeline loads");
    assert_eq!(timeline.len(), 5);

    // Same-second timestamps fall back to id order, newest insert first.
    assert_eq!(timeline[0].entry.action, "Campaign kickoff");
    assert_eq!(timeline[0].business_name, None);
    assert!(timeline
        .iter()
        .any(|item| item.business_name.as_deref() == Some("Gateway Storage")));
    for pair in timeline.windows(2) {
        assert!(pair[0].entry.timestamp >= pair[1].entry.timestamp);
    }
}

#[test]
fn verification_flags_are_set_with_audit_entries() {
    let mut ledger = seeded_ledger();
    ledger
        .mark_verified(4, VerificationKind::Address)
        .expect("address verification records");
    ledger
        .mark_verified(4, VerificationKind::Lender)
        .expect("lender verification records");

    let parcel = ledger.get_parcel(4).expect("parcel reloads");
    assert!(parcel.address_verified);
    assert!(parcel.lender_verified);

    let entries = ledger.entries_for_parcel(4).expect("entries load");
    assert!(entries
        .iter()
        .any(|e| e.action == "Address verified via county records"));
    assert!(entries
        .iter()
        .any(|e| e.action == "Lender of record verified via deed records"));
}

#[test]
fn ledger_persists_across_reopen_and_seeds_rates_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ledger.db");

    {
        let mut ledger =
            CovenantLedger::open(&path, CampusRates::default()).expect("ledger opens");
        ledger
            .insert_parcel(NewParcel {
                address: "6480 Quince Rd".to_string(),
                business_name: "Pointe at Kirby".to_string(),
                sqft: 31_061,
                status: ParcelStatus::Delinquent,
                ..NewParcel::default()
            })
            .expect("parcel inserts");
    }

    let ledger = CovenantLedger::open(&path, CampusRates::default()).expect("ledger reopens");
    let parcels = ledger
        .list_parcels(None, ParcelOrder::StatusThenId)
        .expect("parcels survive reopen");
    assert_eq!(parcels.len(), 1);
    assert_eq!(parcels[0].business_name, "Pointe at Kirby");
    assert_eq!(ledger.log_count().expect("log survives reopen"), 1);

    let schedule = ledger.rate_schedule().expect("rates load");
    assert_eq!(schedule.len(), 5, "rates are seeded exactly once");
    assert!(schedule
        .iter()
        .any(|rate| rate.label == "Current Campus Weekly Rate" && rate.value == 9_000.00));
}

#[test]
fn zero_campus_area_refuses_to_open() {
    let rates = CampusRates {
        total_sqft: 0,
        ..CampusRates::default()
    };
    assert!(matches!(
        CovenantLedger::open_in_memory(rates),
        Err(TrackerError::Config(_))
    ));
}
