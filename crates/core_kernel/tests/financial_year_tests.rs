//! Tests for financial year and fee period handling
//!
//! # Test Organization
//!
//! - `financial_year` - cut-over rules, bounds, labels
//! - `fee_period` - due dates and containment
//! - `properties` - proptest checks over arbitrary dates

use chrono::{Datelike, NaiveDate};
use core_kernel::{CalendarError, FeePeriod, FinancialYear, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod financial_year {
    use super::*;

    #[test]
    fn test_march_31_belongs_to_previous_year() {
        let fy = FinancialYear::containing(date(2025, 3, 31));
        assert_eq!(fy.start_year(), 2024);
        assert_eq!(fy.label(), "2024-25");
    }

    #[test]
    fn test_april_1_starts_new_year() {
        let fy = FinancialYear::containing(date(2025, 4, 1));
        assert_eq!(fy.start_year(), 2025);
    }

    #[test]
    fn test_bounds() {
        let fy = FinancialYear::new(2024).unwrap();
        assert_eq!(fy.start_date(), date(2024, 4, 1));
        assert_eq!(fy.end_date(), date(2025, 3, 31));
        assert!(fy.contains(date(2024, 4, 1)));
        assert!(fy.contains(date(2025, 3, 31)));
        assert!(!fy.contains(date(2024, 3, 31)));
        assert!(!fy.contains(date(2025, 4, 1)));
    }

    #[test]
    fn test_display() {
        let fy = FinancialYear::new(2024).unwrap();
        assert_eq!(fy.to_string(), "FY 2024-25");
    }

    #[test]
    fn test_year_past_calendar_range_is_rejected() {
        assert_eq!(FinancialYear::new(i32::MAX), Err(CalendarError::InvalidYear(i32::MAX)));
        assert_eq!(FinancialYear::new(i32::MIN), Err(CalendarError::InvalidYear(i32::MIN)));
        assert!(FinancialYear::new(300_000).is_err());
    }

    #[test]
    fn test_first_period_is_april() {
        let fy = FinancialYear::new(2023).unwrap();
        assert_eq!(fy.first_period(), FeePeriod::new(4, 2023).unwrap());
    }

    #[test]
    fn test_serde_uses_label() {
        let fy = FinancialYear::new(2024).unwrap();
        let json = serde_json::to_string(&fy).unwrap();
        assert_eq!(json, "\"2024-25\"");
        let back: FinancialYear = serde_json::from_str("\"2024\"").unwrap();
        assert_eq!(back, fy);
        assert!(serde_json::from_str::<FinancialYear>("\"next year\"").is_err());
    }
}

mod fee_period {
    use super::*;

    #[test]
    fn test_due_date_is_first_of_month() {
        let period = FeePeriod::new(2, 2024).unwrap();
        assert_eq!(period.due_date(), date(2024, 2, 1));
    }

    #[test]
    fn test_containing_and_contains() {
        let period = FeePeriod::containing(date(2024, 6, 15));
        assert_eq!(period.month(), 6);
        assert_eq!(period.year(), 2024);
        assert!(period.contains(date(2024, 6, 30)));
        assert!(!period.contains(date(2024, 7, 1)));
    }

    #[test]
    fn test_financial_year_of_january_period() {
        let period = FeePeriod::new(1, 2025).unwrap();
        assert_eq!(period.financial_year().start_year(), 2024);
    }

    #[test]
    fn test_display() {
        assert_eq!(FeePeriod::new(3, 2025).unwrap().to_string(), "2025-03");
    }
}

#[test]
fn test_timezone_parse() {
    let tz: Timezone = "Asia/Kolkata".parse().unwrap();
    assert_eq!(tz, Timezone::default());
    assert!("Mars/Olympus".parse::<Timezone>().is_err());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (1990i32..2100i32, 1u32..=12u32, 1u32..=28u32)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    proptest! {
        #[test]
        fn containing_year_contains_the_date(d in any_date()) {
            let fy = FinancialYear::containing(d);
            prop_assert!(fy.contains(d));
        }

        #[test]
        fn cutover_follows_april_rule(d in any_date()) {
            let fy = FinancialYear::containing(d);
            if d.month() >= 4 {
                prop_assert_eq!(fy.start_year(), d.year());
            } else {
                prop_assert_eq!(fy.start_year(), d.year() - 1);
            }
        }

        #[test]
        fn periods_are_twelve_consecutive_months(d in any_date()) {
            let periods = FinancialYear::containing(d).periods();
            prop_assert_eq!(periods.len(), 12);
            for pair in periods.windows(2) {
                prop_assert!(pair[0] < pair[1]);
                let next = pair[0].due_date().checked_add_months(chrono::Months::new(1)).unwrap();
                prop_assert_eq!(next, pair[1].due_date());
            }
        }
    }
}
