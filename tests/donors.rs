mod common;

use common::{calendar, date, payments_table, sample_payments, two_year_calendar};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use scholarship_reports::FundError;
use scholarship_reports::config::FundConfig;
use scholarship_reports::donors::retention::calendar_year_totals;
use scholarship_reports::donors::{
    Cohort, CohortSummary, Donor, DonorLedger, MajorDonorSummary, RetentionSummary, classify,
    mailing_list, major_donors, non_repeat_donors,
};
use scholarship_reports::io::table::{Cell, Table};

fn sample_ledger() -> DonorLedger {
    let mut ledger = DonorLedger::new();
    ledger
        .ingest_payments(&sample_payments(), &calendar(), &FundConfig::default())
        .expect("payments ingested");
    ledger
}

#[test]
fn payments_accumulate_into_fiscal_and_calendar_slots() {
    let calendar = calendar();
    let mut ledger = DonorLedger::new();
    let table = payments_table(&[
        ("08/31/2024", "Payment", "Alice Adams", 40.0),
        ("09/01/2024", "Payment", "alice  adams", 60.0),
        ("12/31/2024", "Payment", "Alice Adams", 25.0),
    ]);

    let summary = ledger
        .ingest_payments(&table, &calendar, &FundConfig::default())
        .expect("payments ingested");
    let alice = ledger.get("ALICE ADAMS").expect("donor keyed by normalised name");
    let fy2024 = calendar.find("FY2024").expect("configured");
    let fy2025 = calendar.find("FY2025").expect("configured");
    let cy2024 = calendar
        .calendar_year_of(date(2024, 6, 1))
        .expect("in window");

    assert_eq!(summary.accepted, 3);
    assert_eq!(ledger.len(), 1);
    assert_eq!(alice.name(), "Alice Adams");
    assert_eq!(alice.donation(fy2024), dec!(40));
    assert_eq!(alice.donation(fy2025), dec!(85));
    assert_eq!(alice.cal_donation(cy2024), dec!(125));
    assert_eq!(alice.total(), dec!(125));
}

#[test]
fn excluded_and_non_donation_rows_are_skipped() {
    let mut ledger = DonorLedger::new();
    let mut table = payments_table(&[
        ("10/01/2024", "Payment", "Bank Interest", 3.12),
        ("10/01/2024", "Journal Entry", "Alice Adams", 10.0),
        ("10/01/2024", "Payment", "Bob Brown", 20.0),
        ("10/01/2019", "Payment", "Old Donor", 20.0),
    ]);
    table.push_row(vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Number(33.12)]);

    let summary = ledger
        .ingest_payments(&table, &calendar(), &FundConfig::default())
        .expect("payments ingested");

    assert_eq!(summary.rows, 5);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.out_of_range, 1);
    assert!(ledger.get("Bob Brown").is_ok());
    assert!(matches!(
        ledger.get("Bank Interest"),
        Err(FundError::NotFound { .. })
    ));
    assert!(ledger.get("Old Donor").is_err());
}

#[test]
fn malformed_payment_date_aborts_ingestion() {
    let mut ledger = DonorLedger::new();
    let table = payments_table(&[("not a date", "Payment", "Alice Adams", 10.0)]);

    let error = ledger
        .ingest_payments(&table, &calendar(), &FundConfig::default())
        .expect_err("bad date");

    assert!(matches!(error, FundError::InvalidDate { row: 1, .. }));
    assert!(!error.is_fatal());
}

#[test]
fn negative_donation_is_an_invariant_violation() {
    let calendar = calendar();
    let mut donor = Donor::new("Alice Adams", &calendar).expect("donor created");

    let error = donor
        .add_donation(calendar.latest(), dec!(-5))
        .expect_err("negative amount");

    assert!(error.is_fatal());
    assert_eq!(donor.total(), Decimal::ZERO);
}

#[test]
fn blank_donor_name_is_an_invariant_violation() {
    let error = Donor::new("   ", &calendar()).expect_err("blank name");

    assert!(error.is_fatal());
}

#[test]
fn foreign_fiscal_year_is_rejected_on_write_and_reads_zero() {
    let short = two_year_calendar();
    let foreign = calendar().latest();
    let mut donor = Donor::new("Alice Adams", &short).expect("donor created");

    let error = donor
        .add_donation(foreign, dec!(10))
        .expect_err("year outside the donor's calendar");

    assert!(error.is_fatal());
    assert_eq!(donor.donation(foreign), Decimal::ZERO);
    assert!(!donor.donated_in(foreign));
}

#[test]
fn major_donor_threshold_is_inclusive() {
    let calendar = calendar();
    let fy2024 = calendar.earliest();
    let threshold = FundConfig::default().major_donor_threshold;

    let mut at_threshold = Donor::new("Exactly", &calendar).expect("donor created");
    at_threshold
        .add_donation(fy2024, dec!(2000))
        .expect("donation added");
    let mut below = Donor::new("Almost", &calendar).expect("donor created");
    below
        .add_donation(fy2024, dec!(1999.99))
        .expect("donation added");

    assert!(at_threshold.is_major_donor(fy2024, threshold));
    assert!(at_threshold.is_major_donor_overall(&calendar, threshold));
    assert!(!below.is_major_donor(fy2024, threshold));
    assert!(!below.is_major_donor_overall(&calendar, threshold));
}

#[test]
fn non_repeat_donor_compares_against_the_prior_year() {
    let calendar = calendar();
    let fy2024 = calendar.find("FY2024").expect("configured");
    let fy2025 = calendar.find("FY2025").expect("configured");
    let mut donor = Donor::new("Lapsed", &calendar).expect("donor created");
    donor.add_donation(fy2024, dec!(100)).expect("donation added");

    assert!(donor.is_non_repeat_donor(fy2025, &calendar));
    assert!(donor.is_non_repeat_donor(fy2024, &calendar));

    donor.add_donation(fy2025, dec!(1)).expect("donation added");
    assert!(!donor.is_non_repeat_donor(fy2025, &calendar));
}

#[test]
fn classification_checks_prior_year_before_two_years_back() {
    let calendar = calendar();
    let ledger = sample_ledger();
    let fy2024 = calendar.find("FY2024").expect("configured");
    let fy2025 = calendar.find("FY2025").expect("configured");
    let fy2026 = calendar.find("FY2026").expect("configured");

    let alice = ledger.get("Alice Adams").expect("present");
    let bob = ledger.get("Bob Brown").expect("present");
    let carol = ledger.get("Carol Chen").expect("present");
    let dan = ledger.get("Dan Diaz").expect("present");

    assert_eq!(classify(alice, fy2024, &calendar), Some(Cohort::CurrentYear));
    assert_eq!(classify(alice, fy2025, &calendar), Some(Cohort::PriorYear));
    assert_eq!(classify(bob, fy2026, &calendar), Some(Cohort::PriorPriorYear));
    assert_eq!(classify(carol, fy2025, &calendar), Some(Cohort::CurrentYear));
    assert_eq!(classify(dan, fy2026, &calendar), Some(Cohort::CurrentYear));
    assert_eq!(classify(dan, fy2025, &calendar), None);
    assert_eq!(classify(carol, fy2024, &calendar), None);
}

#[test]
fn prior_year_donor_without_a_current_gift_is_still_retained() {
    let calendar = calendar();
    let ledger = sample_ledger();
    let fy2025 = calendar.find("FY2025").expect("configured");
    let fy2026 = calendar.find("FY2026").expect("configured");

    let alice = ledger.get("Alice Adams").expect("present");
    let bob = ledger.get("Bob Brown").expect("present");
    let carol = ledger.get("Carol Chen").expect("present");

    assert_eq!(alice.donation(fy2026), Decimal::ZERO);
    assert_eq!(classify(alice, fy2026, &calendar), Some(Cohort::PriorYear));
    assert_eq!(classify(carol, fy2026, &calendar), Some(Cohort::PriorYear));
    assert_eq!(classify(bob, fy2025, &calendar), Some(Cohort::PriorYear));

    let summary = CohortSummary::build(&ledger, &calendar);
    let year = summary.get(fy2026).expect("summarised");
    assert_eq!(year.count(Cohort::PriorYear), 2);
    assert_eq!(year.sum(Cohort::PriorYear), Decimal::ZERO);
    assert_eq!(year.total_count(), 4);
}

#[test]
fn every_giving_donor_is_classified() {
    let calendar = calendar();
    let ledger = sample_ledger();
    let summary = CohortSummary::build(&ledger, &calendar);

    for fy in calendar.fiscal_years() {
        let classified = ledger
            .iter()
            .filter(|donor| classify(donor, fy, &calendar).is_some())
            .count();
        let given: Decimal = ledger.iter().map(|donor| donor.donation(fy)).sum();
        let year = summary.get(fy).expect("year summarised");

        assert!(
            ledger
                .iter()
                .filter(|donor| donor.donated_in(fy))
                .all(|donor| classify(donor, fy, &calendar).is_some())
        );
        assert_eq!(year.total_count(), classified);
        assert_eq!(year.total_amount(), given);
    }
}

#[test]
fn cohort_summary_counts_sums_and_changes() {
    let calendar = calendar();
    let summary = CohortSummary::build(&sample_ledger(), &calendar);
    let fy2024 = summary.get(calendar.find("FY2024").expect("configured")).expect("summarised");
    let fy2025 = summary.get(calendar.find("FY2025").expect("configured")).expect("summarised");
    let fy2026 = summary.get(calendar.find("FY2026").expect("configured")).expect("summarised");

    assert_eq!(fy2024.count(Cohort::CurrentYear), 2);
    assert_eq!(fy2024.sum(Cohort::CurrentYear), dec!(400));
    assert_eq!(fy2024.average(Cohort::CurrentYear), dec!(200));
    assert_eq!(fy2024.average(Cohort::PriorYear), Decimal::ZERO);
    assert_eq!(fy2024.percent_change, Decimal::ZERO);

    // Bob gave nothing in FY2025 but is retained from FY2024.
    assert_eq!(fy2025.count(Cohort::PriorYear), 2);
    assert_eq!(fy2025.sum(Cohort::PriorYear), dec!(200));
    assert_eq!(fy2025.count(Cohort::CurrentYear), 1);
    assert_eq!(fy2025.total_count(), 3);
    assert_eq!(fy2025.total_amount(), dec!(250));
    assert_eq!(fy2025.overall_average(), dec!(83));
    assert_eq!(fy2025.percent_change, dec!(-59));

    assert_eq!(fy2026.count(Cohort::PriorPriorYear), 1);
    assert_eq!(fy2026.sum(Cohort::PriorPriorYear), dec!(500));
    assert_eq!(fy2026.count(Cohort::CurrentYear), 1);
    assert_eq!(fy2026.total_amount(), dec!(3000));
    assert_eq!(fy2026.overall_average(), dec!(750));
    assert_eq!(fy2026.percent_change, dec!(804));
}

#[test]
fn empty_ledger_yields_zero_sentinels() {
    let calendar = calendar();
    let ledger = DonorLedger::new();

    let cohorts = CohortSummary::build(&ledger, &calendar);
    let major = MajorDonorSummary::build(&ledger, &calendar, dec!(2000));
    let retention = RetentionSummary::build(&ledger, &calendar);

    for year in &cohorts.years {
        assert_eq!(year.overall_average(), Decimal::ZERO);
        assert_eq!(year.percent_change, Decimal::ZERO);
    }
    for year in &major.years {
        assert_eq!(year.average, Decimal::ZERO);
        assert_eq!(year.percent_of_total, Decimal::ZERO);
    }
    for year in &retention.years {
        assert_eq!(year.retention_percent, Decimal::ZERO);
    }
}

#[test]
fn aggregation_is_deterministic() {
    let calendar = calendar();
    let ledger = sample_ledger();

    assert_eq!(
        CohortSummary::build(&ledger, &calendar),
        CohortSummary::build(&ledger, &calendar)
    );
    assert_eq!(
        MajorDonorSummary::build(&ledger, &calendar, dec!(2000)),
        MajorDonorSummary::build(&ledger, &calendar, dec!(2000))
    );
}

#[test]
fn major_donor_summary_partitions_by_year() {
    let calendar = calendar();
    let ledger = sample_ledger();
    let fy2026 = calendar.find("FY2026").expect("configured");
    let summary = MajorDonorSummary::build(&ledger, &calendar, dec!(2000));
    let year = summary.get(fy2026).expect("summarised");

    assert_eq!(year.count, 1);
    assert_eq!(year.total, dec!(2500));
    assert_eq!(year.average, dec!(2500));
    assert_eq!(year.percent_of_total, dec!(83));
    assert_eq!(year.percent_change, Decimal::ZERO);

    let names: Vec<&str> = major_donors(&ledger, fy2026, dec!(300))
        .into_iter()
        .map(Donor::name)
        .collect();
    assert_eq!(names, vec!["Dan Diaz", "Bob Brown"]);
}

#[test]
fn retention_counts_lapsed_donors() {
    let calendar = calendar();
    let ledger = sample_ledger();
    let fy2025 = calendar.find("FY2025").expect("configured");
    let summary = RetentionSummary::build(&ledger, &calendar);

    assert_eq!(summary.years.len(), 2);
    let first = &summary.years[0];
    assert_eq!(first.fiscal_year, fy2025);
    assert_eq!(first.prior_donors, 2);
    assert_eq!(first.retained, 1);
    assert_eq!(first.lapsed, 1);
    assert_eq!(first.retention_percent, dec!(50));

    let lapsed: Vec<&str> = non_repeat_donors(&ledger, fy2025, &calendar)
        .into_iter()
        .map(Donor::name)
        .collect();
    assert_eq!(lapsed, vec!["Bob Brown"]);
}

#[test]
fn calendar_year_totals_follow_payment_dates() {
    let calendar = calendar();
    let totals = calendar_year_totals(&sample_ledger(), &calendar);

    let by_year: Vec<(i32, usize, Decimal)> = totals
        .iter()
        .map(|year| (year.year, year.donors, year.total))
        .collect();
    assert_eq!(
        by_year,
        vec![
            (2023, 2, dec!(400)),
            (2024, 2, dec!(250)),
            (2025, 2, dec!(3000)),
            (2026, 0, Decimal::ZERO),
        ]
    );
}

#[test]
fn address_list_feeds_the_mailing_list() {
    let calendar = calendar();
    let mut ledger = sample_ledger();
    let addresses = Table::new(&["Name", "Street", "City", "State", "Zip", "Email", "Household"])
        .with_row(vec![
            Cell::from("Dan Diaz"),
            Cell::from("1 Elm St"),
            Cell::from("Springfield"),
            Cell::from("IL"),
            Cell::from("62701"),
            Cell::from("dan@example.org"),
            Cell::Number(3.0),
        ])
        .with_row(vec![
            Cell::from("Carol Chen"),
            Cell::from("2 Oak Ave"),
            Cell::from("Springfield"),
            Cell::from("IL"),
            Cell::from("62702"),
            Cell::Empty,
            Cell::Empty,
        ])
        .with_row(vec![
            Cell::from("Erin Evans"),
            Cell::from("3 Pine Rd"),
            Cell::from("Springfield"),
            Cell::from("IL"),
            Cell::from("62703"),
            Cell::Empty,
            Cell::Empty,
        ]);

    let applied = ledger
        .ingest_addresses(&addresses, &calendar)
        .expect("addresses merged");
    let fy2026 = calendar.find("FY2026").expect("configured");
    let entries = mailing_list(&ledger, fy2026, &calendar, dec!(2000));

    assert_eq!(applied, 3);
    assert_eq!(ledger.len(), 5);
    let names: Vec<(&str, bool)> = entries
        .iter()
        .map(|entry| (entry.donor.name(), entry.major))
        .collect();
    assert_eq!(names, vec![("Carol Chen", false), ("Dan Diaz", true)]);
    assert_eq!(entries[1].donor.household_size, Some(3));
    assert_eq!(entries[1].donor.email, "dan@example.org");
}
