//! Custom Test Assertions
//!
//! Assertion helpers for fee schedules that print the offending month
//! instead of a bare `assertion failed`.

use std::collections::BTreeSet;

use core_kernel::{FeePeriod, FinancialYear, Money};
use domain_fees::{FeeSchedule, MonthlyFeeObligation};

/// Asserts that two Money values have the same currency and amount
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts the schedule has exactly one obligation per month of its year
pub fn assert_covers_financial_year(schedule: &FeeSchedule) {
    let expected: BTreeSet<FeePeriod> = schedule.financial_year.periods().into_iter().collect();
    let actual: BTreeSet<FeePeriod> = schedule.obligations.iter().map(|o| o.period).collect();

    assert_eq!(
        schedule.obligations.len(),
        12,
        "Expected 12 obligations for {}, got {}",
        schedule.financial_year.label(),
        schedule.obligations.len()
    );
    assert_eq!(
        actual, expected,
        "Schedule for {} does not cover April to March",
        schedule.financial_year.label()
    );
}

/// Asserts that at most one month of the schedule carries an admission fee
pub fn assert_single_admission_month(schedule: &FeeSchedule) {
    let charged: Vec<FeePeriod> = schedule
        .obligations
        .iter()
        .filter(|o| !o.admission_fee.is_zero())
        .map(|o| o.period)
        .collect();

    assert!(
        charged.len() <= 1,
        "Admission fee charged in {} months: {:?}",
        charged.len(),
        charged
    );
}

/// Asserts stored obligations belong to `year` and are ordered by due date
pub fn assert_stored_year(obligations: &[MonthlyFeeObligation], year: FinancialYear) {
    for ob in obligations {
        assert!(
            year.contains(ob.due_date),
            "Obligation due {} is outside {}",
            ob.due_date,
            year.label()
        );
    }
    assert!(
        obligations.windows(2).all(|w| w[0].due_date <= w[1].due_date),
        "Obligations are not ordered by due date"
    );
}
