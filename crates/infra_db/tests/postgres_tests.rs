//! PostgreSQL adapter tests
//!
//! These start a PostgreSQL container and are ignored by default. Run with
//! `cargo test -p infra_db -- --ignored` on a machine with Docker.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{Currency, FinancialYear, Money, PortError};
use domain_admissions::StudentPort;
use domain_expenses::{ExpenseCategory, ExpensePort, ExpenseQuery};
use domain_fees::{
    AdmissionFeeRule, EnrollmentPort, FeeObligationPort, FeePaymentService, FeeScheduleService,
    FeeSettingsPort, PaymentMethod, RecordPayment,
};
use infra_db::{
    PostgresExpenseAdapter, PostgresFeeAdapter, PostgresSettingsAdapter, PostgresStudentAdapter,
};
use test_utils::{AdmissionBuilder, DateFixtures, ExpenseBuilder, SettingsFixtures, TestDatabase};

async fn seeded_settings(db: &TestDatabase) -> PostgresSettingsAdapter {
    let adapter = PostgresSettingsAdapter::new(db.pool().clone());
    let standard = SettingsFixtures::standard();
    adapter
        .save_class_fees(Currency::INR, standard.class_fees.clone())
        .await
        .unwrap();
    adapter
        .save_transport_bands(Currency::INR, standard.transport_bands.clone())
        .await
        .unwrap();
    adapter
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_admission_numbers_are_sequential_per_year() {
    let db = TestDatabase::new().await.unwrap();
    let students = PostgresStudentAdapter::new(db.pool().clone());

    let first = students.create_student(AdmissionBuilder::new().build()).await.unwrap();
    let second = students
        .create_student(AdmissionBuilder::new().with_name("Diya", "Iyer").build())
        .await
        .unwrap();
    let next_year = students
        .create_student(
            AdmissionBuilder::new()
                .with_admission_date(DateFixtures::date(2025, 4, 2))
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(first.admission_number, "ADM-2024-0001");
    assert_eq!(second.admission_number, "ADM-2024-0002");
    assert_eq!(next_year.admission_number, "ADM-2025-0001");
    assert_eq!(students.get_student(first.id).await.unwrap(), first);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_settings_round_trip() {
    let db = TestDatabase::new().await.unwrap();
    let settings = seeded_settings(&db).await;

    let loaded = settings.load_settings().await.unwrap().unwrap();
    assert_eq!(loaded.class_fees.len(), 4);
    assert_eq!(
        loaded.transport_bands.fee_for_distance(dec!(7)),
        Some(Money::new(dec!(1200), Currency::INR))
    );

    let usd = settings
        .save_class_fees(Currency::USD, loaded.class_fees.clone())
        .await;
    assert!(matches!(usd, Err(PortError::Validation { .. })));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_schedule_generation_is_idempotent() {
    let db = TestDatabase::new().await.unwrap();
    let settings = Arc::new(seeded_settings(&db).await);
    let students = PostgresStudentAdapter::new(db.pool().clone());
    let fees = Arc::new(PostgresFeeAdapter::new(db.pool().clone()));

    let student = students.create_student(AdmissionBuilder::new().build()).await.unwrap();
    let service = FeeScheduleService::new(
        settings,
        fees.clone(),
        fees.clone(),
        AdmissionFeeRule::AdmissionMonth,
    );

    let first = service
        .generate_for_admission(student.id, &student.class_enrolled, student.admission_date)
        .await
        .unwrap();
    assert_eq!(first.created_count(), 12);

    let second = service
        .generate_for_admission(student.id, &student.class_enrolled, student.admission_date)
        .await
        .unwrap();
    assert!(second.is_noop());
    assert_eq!(second.skipped.len(), 12);

    let stored = fees.list_for_student(student.id).await.unwrap();
    assert_eq!(stored.len(), 12);
    let june = stored.iter().find(|o| o.month == 6).unwrap();
    assert_eq!(june.admission_fee, Money::new(dec!(2500), Currency::INR));
    assert!(fees.enrollments_without_fees().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_stale_payment_is_rejected() {
    let db = TestDatabase::new().await.unwrap();
    let settings = Arc::new(seeded_settings(&db).await);
    let students = PostgresStudentAdapter::new(db.pool().clone());
    let fees = Arc::new(PostgresFeeAdapter::new(db.pool().clone()));

    let student = students.create_student(AdmissionBuilder::new().build()).await.unwrap();
    FeeScheduleService::new(settings, fees.clone(), fees.clone(), AdmissionFeeRule::AdmissionMonth)
        .generate_manual(student.id, Some(FinancialYear::new(2024).unwrap()), DateFixtures::june_admission())
        .await
        .unwrap();

    let april = fees.list_for_student(student.id).await.unwrap().remove(0);
    let payments = FeePaymentService::new(fees.clone());
    let request = RecordPayment {
        amount: Money::new(dec!(2000), Currency::INR),
        method: PaymentMethod::Upi,
        paid_on: DateFixtures::date(2024, 4, 5),
        remarks: None,
    };
    let (updated, payment) = payments.record_payment(april.id, request.clone()).await.unwrap();
    assert_eq!(updated.paid_amount, Money::new(dec!(2000), Currency::INR));
    let stored = fees.list_payments(april.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].receipt_number, payment.receipt_number);

    // Replaying the write against the old paid amount must fail
    let mut stale = april.clone();
    stale.apply_payment(request.amount, request.paid_on).unwrap();
    let replay = domain_fees::FeePayment::new(april.id, student.id, request);
    let result = fees.record_payment(&stale, april.paid_amount, &replay).await;
    assert!(matches!(result, Err(PortError::Conflict { .. })));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_expense_filters() {
    let db = TestDatabase::new().await.unwrap();
    let expenses = PostgresExpenseAdapter::new(db.pool().clone());

    expenses
        .create_expense(ExpenseBuilder::new().on(DateFixtures::date(2024, 7, 5)).build())
        .await
        .unwrap();
    let salary = expenses
        .create_expense(
            ExpenseBuilder::new()
                .with_category(ExpenseCategory::Salary)
                .with_amount(dec!(45000))
                .on(DateFixtures::date(2024, 8, 1))
                .build(),
        )
        .await
        .unwrap();

    let august = expenses
        .list_expenses(ExpenseQuery {
            from: Some(DateFixtures::date(2024, 8, 1)),
            to: None,
            category: None,
        })
        .await
        .unwrap();
    assert_eq!(august, vec![salary.clone()]);

    expenses.delete_expense(salary.id).await.unwrap();
    let again = expenses.delete_expense(salary.id).await;
    assert!(matches!(again, Err(PortError::NotFound { .. })));
}
