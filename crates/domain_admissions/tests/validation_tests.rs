//! Admission validation tests
//!
//! # Test Organization
//!
//! - `dates` - birth and admission date ordering
//! - `properties` - proptest checks over phone numbers and distances

use chrono::NaiveDate;
use rust_decimal::Decimal;

use domain_admissions::{AdmissionValidator, Gender, NewAdmission};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn base() -> NewAdmission {
    NewAdmission {
        first_name: "Tara".into(),
        last_name: "Nair".into(),
        date_of_birth: date(2019, 9, 9),
        gender: Gender::Female,
        class_enrolled: "Nursery".into(),
        section: None,
        guardian_name: "Vivek Nair".into(),
        guardian_phone: "9000000001".into(),
        guardian_email: None,
        address: None,
        admission_date: date(2024, 4, 1),
        transport_distance_km: None,
    }
}

mod dates {
    use super::*;

    #[test]
    fn test_admission_today_is_allowed() {
        assert!(AdmissionValidator::validate(&base(), date(2024, 4, 1)).is_valid);
    }

    #[test]
    fn test_born_on_admission_day_is_rejected() {
        let mut admission = base();
        admission.date_of_birth = admission.admission_date;
        let result = AdmissionValidator::validate(&admission, date(2024, 4, 1));
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("Date of birth"));
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ten_to_fifteen_digit_phones_pass(digits in "[0-9]{10,15}", plus in any::<bool>()) {
            let mut admission = base();
            admission.guardian_phone = if plus { format!("+{}", digits) } else { digits };
            prop_assert!(AdmissionValidator::validate(&admission, date(2024, 4, 1)).is_valid);
        }

        #[test]
        fn short_phones_fail(digits in "[0-9]{0,9}") {
            let mut admission = base();
            admission.guardian_phone = digits;
            prop_assert!(!AdmissionValidator::validate(&admission, date(2024, 4, 1)).is_valid);
        }

        #[test]
        fn negative_distance_fails(cents in 1i64..1_000_000i64) {
            let mut admission = base();
            admission.transport_distance_km = Some(Decimal::new(-cents, 2));
            prop_assert!(!AdmissionValidator::validate(&admission, date(2024, 4, 1)).is_valid);
        }
    }
}
