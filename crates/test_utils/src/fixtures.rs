//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the school fees system. Values are fixed so
//! tests can assert on exact amounts.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, FinancialYear, Money, StudentId};
use domain_fees::{
    ClassFee, ClassFeeTable, Enrollment, FeeSettings, TransportFeeBand, TransportFeeBands,
};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn inr(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    pub fn inr_zero() -> Money {
        Money::zero(Currency::INR)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for calendar test data
pub struct DateFixtures;

impl DateFixtures {
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap_or_else(|| panic!("invalid fixture date {}-{}-{}", year, month, day))
    }

    /// FY 2024-25
    pub fn fy_2024() -> FinancialYear {
        FinancialYear::containing(Self::date(2024, 4, 1))
    }

    /// A mid-year admission (10 June 2024)
    pub fn june_admission() -> NaiveDate {
        Self::date(2024, 6, 10)
    }

    /// An admission in the final quarter of FY 2024-25 (15 January 2025)
    pub fn january_admission() -> NaiveDate {
        Self::date(2025, 1, 15)
    }

    pub fn birth_date() -> NaiveDate {
        Self::date(2016, 3, 21)
    }
}

/// Class rates (monthly tuition, admission fee) used by
/// [`SettingsFixtures::standard`]
pub const STANDARD_CLASSES: [(&str, i64, i64); 4] = [
    ("Nursery", 3000, 1500),
    ("Class 1", 4000, 2000),
    ("Class 5", 5000, 2500),
    ("Class 10", 7000, 5000),
];

static STANDARD_SETTINGS: Lazy<FeeSettings> = Lazy::new(|| {
    let class_fees = STANDARD_CLASSES
        .iter()
        .map(|(name, tuition, admission)| {
            ClassFee::new(
                *name,
                MoneyFixtures::inr(Decimal::from(*tuition)),
                MoneyFixtures::inr(Decimal::from(*admission)),
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .and_then(ClassFeeTable::new)
        .expect("standard class fees are valid");

    let bands = TransportFeeBands::new(vec![
        TransportFeeBand::new(dec!(0), dec!(5), MoneyFixtures::inr(dec!(800)))
            .expect("band is valid"),
        TransportFeeBand::new(dec!(5.01), dec!(10), MoneyFixtures::inr(dec!(1200)))
            .expect("band is valid"),
    ])
    .expect("bands do not overlap");

    FeeSettings::new(Currency::INR)
        .with_class_fees(class_fees)
        .and_then(|s| s.with_transport_bands(bands))
        .expect("standard settings are valid")
});

/// Fixture for fee settings
pub struct SettingsFixtures;

impl SettingsFixtures {
    /// INR settings with the [`STANDARD_CLASSES`] rates and two transport bands
    pub fn standard() -> FeeSettings {
        STANDARD_SETTINGS.clone()
    }

    /// Settings with no classes configured
    pub fn empty() -> FeeSettings {
        FeeSettings::new(Currency::INR)
    }
}

/// Fixture for enrollments
pub struct EnrollmentFixtures;

impl EnrollmentFixtures {
    /// An active "Class 5" student admitted on 10 June 2024
    pub fn class_5_june() -> Enrollment {
        Enrollment {
            student_id: StudentId::new_v7(),
            class_enrolled: "Class 5".to_string(),
            admission_date: DateFixtures::june_admission(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_settings() {
        let settings = SettingsFixtures::standard();
        assert_eq!(settings.class_fees.len(), STANDARD_CLASSES.len());
        assert_eq!(
            settings.class_fee("class 5").unwrap().admission_fee,
            MoneyFixtures::inr(dec!(2500))
        );
        assert_eq!(settings.transport_bands.len(), 2);
    }

    #[test]
    fn test_june_admission_is_in_fy_2024() {
        assert!(DateFixtures::fy_2024().contains(DateFixtures::june_admission()));
        assert!(DateFixtures::fy_2024().contains(DateFixtures::january_admission()));
    }
}
