//! Unit tests for the Identifiers module
//!
//! Tests cover identifier creation, parsing, conversion, and display.

use core_kernel::{
    StudentId, FeeObligationId, FeePaymentId, ExpenseId,
    ClassFeeId, TransportBandId, SettingsId,
};
use uuid::Uuid;

mod student_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(StudentId::new(), StudentId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = StudentId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = StudentId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_display_format() {
        let id = StudentId::new();
        assert!(id.to_string().starts_with("STU-"));
    }

    #[test]
    fn test_from_str_with_and_without_prefix() {
        let original = StudentId::new();
        let with_prefix: StudentId = original.to_string().parse().unwrap();
        let bare: StudentId = original.as_uuid().to_string().parse().unwrap();
        assert_eq!(original, with_prefix);
        assert_eq!(original, bare);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("STU-not-a-uuid".parse::<StudentId>().is_err());
    }

    #[test]
    fn test_json_is_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = StudentId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
        let back: StudentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

mod fee_ids {
    use super::*;

    #[test]
    fn test_receipt_prefix() {
        assert_eq!(FeePaymentId::prefix(), "RCPT");
        assert!(FeePaymentId::new().to_string().starts_with("RCPT-"));
    }

    #[test]
    fn test_obligation_roundtrip() {
        let id = FeeObligationId::new_v7();
        let parsed: FeeObligationId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}

#[test]
fn test_id_prefixes_are_unique() {
    let prefixes = vec![
        StudentId::prefix(),
        FeeObligationId::prefix(),
        FeePaymentId::prefix(),
        ExpenseId::prefix(),
        ClassFeeId::prefix(),
        TransportBandId::prefix(),
        SettingsId::prefix(),
    ];

    let mut unique_prefixes = prefixes.clone();
    unique_prefixes.sort();
    unique_prefixes.dedup();

    assert_eq!(prefixes.len(), unique_prefixes.len());
}

#[test]
fn test_nil_uuid() {
    let id = ExpenseId::from_uuid(Uuid::nil());
    assert!(id.as_uuid().is_nil());
}
