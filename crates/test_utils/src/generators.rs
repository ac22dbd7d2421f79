//! Property-Based Test Generators
//!
//! Proptest strategies that produce values which already satisfy the
//! domain's invariants.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, FinancialYear, Money};
use domain_fees::{ClassFee, ClassFeeTable, FeeSettings};

/// Whole-rupee fee amounts up to one lakh, zero included
pub fn fee_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000i64).prop_map(Decimal::from)
}

/// INR amounts in paise, strictly positive
pub fn positive_inr_strategy() -> impl Strategy<Value = Money> {
    (1i64..10_000_000i64).prop_map(|paise| Money::from_minor(paise, Currency::INR))
}

/// Any date between 2000-01-01 and 2099-12-31
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..36_524i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default() + Duration::days(days)
    })
}

/// Financial years starting 2000..2098
pub fn financial_year_strategy() -> impl Strategy<Value = FinancialYear> {
    (2000i32..2099i32).prop_filter_map("valid financial year", |start| FinancialYear::new(start).ok())
}

/// A date inside the given financial year
pub fn date_in_year_strategy(year: FinancialYear) -> impl Strategy<Value = NaiveDate> {
    let span = (year.end_date() - year.start_date()).num_days();
    (0i64..=span).prop_map(move |offset| year.start_date() + Duration::days(offset))
}

/// INR settings with one to eight classes named "Class 1".."Class N"
pub fn settings_strategy() -> impl Strategy<Value = FeeSettings> {
    prop::collection::vec((fee_amount_strategy(), fee_amount_strategy()), 1..=8).prop_filter_map(
        "valid settings",
        |rates| {
            let fees = rates
                .into_iter()
                .enumerate()
                .map(|(i, (tuition, admission))| {
                    ClassFee::new(
                        format!("Class {}", i + 1),
                        Money::new(tuition, Currency::INR),
                        Money::new(admission, Currency::INR),
                    )
                })
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            let table = ClassFeeTable::new(fees).ok()?;
            FeeSettings::new(Currency::INR).with_class_fees(table).ok()
        },
    )
}
