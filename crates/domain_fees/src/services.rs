//! Fee application services
//!
//! [`FeeScheduleService`] is the single place fee schedules are created. The
//! three entry points differ only in how they pick the anchor date:
//!
//! | Entry point | Anchor |
//! |-------------|--------|
//! | [`FeeScheduleService::generate_for_admission`] | admission date |
//! | [`FeeScheduleService::generate_manual`] | today, or 1 April of the requested year |
//! | [`FeeScheduleService::backfill`] | each student's admission date |
//!
//! Each run loads settings, computes twelve obligations and submits them in
//! one duplicate-skipping insert. The outcome reports which periods were new
//! and which already existed.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{Currency, FeeObligationId, FeePeriod, FinancialYear, PortError, StudentId};

use crate::error::FeeError;
use crate::obligation::MonthlyFeeObligation;
use crate::payment::{FeePayment, RecordPayment};
use crate::ports::{EnrollmentPort, FeeObligationPort, FeeSettingsPort};
use crate::schedule::{AdmissionFeeAttribution, AdmissionFeeRule, FeeScheduleGenerator};
use crate::settings::FeeSettings;
use crate::statement::FeeStatement;

/// One schedule generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub student_id: StudentId,
    pub class_enrolled: String,
    /// Any date inside the financial year to generate
    pub anchor: NaiveDate,
    pub attribution: AdmissionFeeAttribution,
}

/// Result of a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub student_id: StudentId,
    pub financial_year: FinancialYear,
    /// Periods inserted by this run
    pub created: Vec<FeePeriod>,
    /// Periods that already had an obligation
    pub skipped: Vec<FeePeriod>,
}

impl GenerationOutcome {
    /// Number of newly inserted obligations (0-12)
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    /// True if every period already existed
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

/// A student the backfill could not generate fees for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillFailure {
    pub student_id: StudentId,
    pub reason: String,
}

/// Summary of a backfill run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    /// Students without fees that were attempted
    pub processed: usize,
    /// Obligations inserted across all students
    pub generated: usize,
    pub failures: Vec<BackfillFailure>,
}

impl BackfillReport {
    pub fn succeeded(&self) -> usize {
        self.processed - self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Creates fee schedules
pub struct FeeScheduleService {
    settings: Arc<dyn FeeSettingsPort>,
    obligations: Arc<dyn FeeObligationPort>,
    enrollments: Arc<dyn EnrollmentPort>,
    rule: AdmissionFeeRule,
}

impl FeeScheduleService {
    pub fn new(
        settings: Arc<dyn FeeSettingsPort>,
        obligations: Arc<dyn FeeObligationPort>,
        enrollments: Arc<dyn EnrollmentPort>,
        rule: AdmissionFeeRule,
    ) -> Self {
        Self {
            settings,
            obligations,
            enrollments,
            rule,
        }
    }

    pub fn rule(&self) -> AdmissionFeeRule {
        self.rule
    }

    /// Loads the settings snapshot, failing if none exists
    pub async fn load_settings(&self) -> Result<FeeSettings, FeeError> {
        self.settings
            .load_settings()
            .await
            .map_err(FeeError::persistence)?
            .ok_or(FeeError::SettingsNotFound)
    }

    /// Generates and stores one financial year of obligations
    #[instrument(skip(self, request), fields(student_id = %request.student_id, anchor = %request.anchor))]
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome, FeeError> {
        let settings = self.load_settings().await?;
        let schedule = FeeScheduleGenerator::new(&settings).generate(
            request.student_id,
            &request.class_enrolled,
            request.anchor,
            request.attribution,
        )?;

        let periods = schedule.periods();
        let created = self
            .obligations
            .insert_skipping_duplicates(schedule.obligations)
            .await
            .map_err(FeeError::persistence)?;
        let skipped = periods
            .into_iter()
            .filter(|p| !created.contains(p))
            .collect::<Vec<_>>();

        info!(
            financial_year = %schedule.financial_year,
            created = created.len(),
            skipped = skipped.len(),
            "Fee schedule generated"
        );

        Ok(GenerationOutcome {
            student_id: request.student_id,
            financial_year: schedule.financial_year,
            created,
            skipped,
        })
    }

    /// Generates the schedule for a newly admitted student
    pub async fn generate_for_admission(
        &self,
        student_id: StudentId,
        class_enrolled: &str,
        admission_date: NaiveDate,
    ) -> Result<GenerationOutcome, FeeError> {
        self.generate(GenerationRequest {
            student_id,
            class_enrolled: class_enrolled.to_string(),
            anchor: admission_date,
            attribution: self.rule.attribution(admission_date),
        })
        .await
    }

    /// Generates on request for an existing student
    ///
    /// Without an academic year the anchor is `today`; with one it is
    /// 1 April of that year.
    pub async fn generate_manual(
        &self,
        student_id: StudentId,
        academic_year: Option<FinancialYear>,
        today: NaiveDate,
    ) -> Result<GenerationOutcome, FeeError> {
        let enrollment = self
            .enrollments
            .get_enrollment(student_id)
            .await
            .map_err(|e| match e {
                PortError::NotFound { .. } => FeeError::StudentNotFound(student_id.to_string()),
                other => FeeError::persistence(other),
            })?;

        let anchor = academic_year.map(|fy| fy.start_date()).unwrap_or(today);

        self.generate(GenerationRequest {
            student_id,
            class_enrolled: enrollment.class_enrolled,
            anchor,
            attribution: self.rule.attribution(enrollment.admission_date),
        })
        .await
    }

    /// Generates schedules for every active student that has none
    ///
    /// A failure for one student is recorded in the report and the run
    /// moves on to the next.
    #[instrument(skip(self))]
    pub async fn backfill(&self) -> Result<BackfillReport, FeeError> {
        let pending = self
            .enrollments
            .enrollments_without_fees()
            .await
            .map_err(FeeError::persistence)?;

        info!(students = pending.len(), "Starting fee backfill");

        let mut report = BackfillReport::default();
        for enrollment in pending {
            report.processed += 1;
            let result = self
                .generate_for_admission(
                    enrollment.student_id,
                    &enrollment.class_enrolled,
                    enrollment.admission_date,
                )
                .await;

            match result {
                Ok(outcome) => report.generated += outcome.created_count(),
                Err(error) => {
                    warn!(student_id = %enrollment.student_id, %error, "Backfill failed for student");
                    report.failures.push(BackfillFailure {
                        student_id: enrollment.student_id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.processed,
            generated = report.generated,
            failed = report.failures.len(),
            "Fee backfill finished"
        );
        Ok(report)
    }
}

/// Records payments and reports balances
pub struct FeePaymentService {
    obligations: Arc<dyn FeeObligationPort>,
}

impl FeePaymentService {
    pub fn new(obligations: Arc<dyn FeeObligationPort>) -> Self {
        Self { obligations }
    }

    /// Applies a payment to an obligation and stores the receipt
    #[instrument(skip(self, request), fields(obligation_id = %obligation_id))]
    pub async fn record_payment(
        &self,
        obligation_id: FeeObligationId,
        request: RecordPayment,
    ) -> Result<(MonthlyFeeObligation, FeePayment), FeeError> {
        let mut obligation = self.get_obligation(obligation_id).await?;
        let expected_paid = obligation.paid_amount;

        obligation.apply_payment(request.amount, request.paid_on)?;
        let payment = FeePayment::new(obligation.id, obligation.student_id, request);

        self.obligations
            .record_payment(&obligation, expected_paid, &payment)
            .await
            .map_err(FeeError::persistence)?;

        info!(
            receipt = %payment.receipt_number,
            status = %obligation.status,
            "Fee payment recorded"
        );
        Ok((obligation, payment))
    }

    pub async fn get_obligation(&self, id: FeeObligationId) -> Result<MonthlyFeeObligation, FeeError> {
        self.obligations.get_obligation(id).await.map_err(|e| match e {
            PortError::NotFound { .. } => FeeError::ObligationNotFound(id.to_string()),
            other => FeeError::persistence(other),
        })
    }

    pub async fn list_payments(&self, obligation_id: FeeObligationId) -> Result<Vec<FeePayment>, FeeError> {
        self.get_obligation(obligation_id).await?;
        self.obligations
            .list_payments(obligation_id)
            .await
            .map_err(FeeError::persistence)
    }

    /// Builds the student's statement as of `as_of`
    pub async fn statement(
        &self,
        student_id: StudentId,
        currency: Currency,
        as_of: NaiveDate,
    ) -> Result<FeeStatement, FeeError> {
        let obligations = self
            .obligations
            .list_for_student(student_id)
            .await
            .map_err(FeeError::persistence)?;
        FeeStatement::from_obligations(student_id, obligations, currency, as_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentMethod;
    use crate::ports::mock::InMemoryFeeStore;
    use crate::ports::Enrollment;
    use crate::settings::{ClassFee, ClassFeeTable};
    use crate::obligation::FeeStatus;
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inr(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    fn settings() -> FeeSettings {
        let table = ClassFeeTable::new(vec![
            ClassFee::new("Class 5", inr(dec!(5000)), inr(dec!(2000))).unwrap(),
            ClassFee::new("Nursery", inr(dec!(3000)), inr(dec!(1000))).unwrap(),
        ])
        .unwrap();
        FeeSettings::new(Currency::INR).with_class_fees(table).unwrap()
    }

    fn service(store: Arc<InMemoryFeeStore>, rule: AdmissionFeeRule) -> FeeScheduleService {
        FeeScheduleService::new(store.clone(), store.clone(), store, rule)
    }

    #[tokio::test]
    async fn test_generation_is_idempotent() {
        let store = Arc::new(InMemoryFeeStore::with_settings(settings()));
        let service = service(store.clone(), AdmissionFeeRule::FinancialYearStart);
        let student = StudentId::new();

        let first = service
            .generate_for_admission(student, "Class 5", date(2024, 6, 15))
            .await
            .unwrap();
        assert_eq!(first.created_count(), 12);
        assert!(first.skipped.is_empty());

        let second = service
            .generate_for_admission(student, "Class 5", date(2024, 6, 15))
            .await
            .unwrap();
        assert!(second.is_noop());
        assert_eq!(second.skipped.len(), 12);
        assert_eq!(store.obligation_count().await, 12);
    }

    #[tokio::test]
    async fn test_missing_settings() {
        let store = Arc::new(InMemoryFeeStore::new());
        let service = service(store.clone(), AdmissionFeeRule::default());

        let result = service
            .generate_for_admission(StudentId::new(), "Class 5", date(2024, 6, 15))
            .await;
        assert!(matches!(result, Err(FeeError::SettingsNotFound)));
        assert_eq!(store.obligation_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_class_inserts_nothing() {
        let store = Arc::new(InMemoryFeeStore::with_settings(settings()));
        let service = service(store.clone(), AdmissionFeeRule::default());

        let result = service
            .generate_for_admission(StudentId::new(), "Class 12", date(2024, 6, 15))
            .await;
        assert!(matches!(result, Err(FeeError::ClassFeeNotFound(_))));
        assert_eq!(store.obligation_count().await, 0);
    }

    #[tokio::test]
    async fn test_manual_generation_for_requested_year() {
        let store = Arc::new(InMemoryFeeStore::with_settings(settings()));
        let student = StudentId::new();
        store
            .add_enrollment(Enrollment {
                student_id: student,
                class_enrolled: "Nursery".to_string(),
                admission_date: date(2023, 8, 1),
                is_active: true,
            })
            .await;
        let service = service(store.clone(), AdmissionFeeRule::AdmissionMonth);

        let fy = FinancialYear::new(2025).unwrap();
        let outcome = service
            .generate_manual(student, Some(fy), date(2024, 1, 10))
            .await
            .unwrap();

        assert_eq!(outcome.financial_year, fy);
        assert_eq!(outcome.created.first(), Some(&FeePeriod::new(4, 2025).unwrap()));

        let stored = store.list_for_student(student).await.unwrap();
        // admitted in an earlier year, so the fee falls back to April
        assert_eq!(stored[0].admission_fee.amount(), dec!(1000));
        assert!(stored[1..].iter().all(|o| o.admission_fee.is_zero()));
    }

    #[tokio::test]
    async fn test_manual_generation_defaults_to_today() {
        let store = Arc::new(InMemoryFeeStore::with_settings(settings()));
        let student = StudentId::new();
        store
            .add_enrollment(Enrollment {
                student_id: student,
                class_enrolled: "Class 5".to_string(),
                admission_date: date(2024, 11, 4),
                is_active: true,
            })
            .await;
        let service = service(store.clone(), AdmissionFeeRule::AdmissionMonth);

        let outcome = service
            .generate_manual(student, None, date(2025, 2, 1))
            .await
            .unwrap();
        assert_eq!(outcome.financial_year.start_year(), 2024);

        let stored = store.list_for_student(student).await.unwrap();
        let charged: Vec<_> = stored.iter().filter(|o| !o.admission_fee.is_zero()).collect();
        assert_eq!(charged.len(), 1);
        assert_eq!((charged[0].month, charged[0].year), (11, 2024));
    }

    #[tokio::test]
    async fn test_manual_generation_unknown_student() {
        let store = Arc::new(InMemoryFeeStore::with_settings(settings()));
        let service = service(store, AdmissionFeeRule::default());

        let result = service
            .generate_manual(StudentId::new(), None, date(2024, 6, 1))
            .await;
        assert!(matches!(result, Err(FeeError::StudentNotFound(_))));
    }

    #[tokio::test]
    async fn test_backfill_continues_past_failures() {
        let store = Arc::new(InMemoryFeeStore::with_settings(settings()));
        let good = StudentId::new();
        let bad_class = StudentId::new();
        let broken = StudentId::new();

        for (id, class) in [(good, "Class 5"), (bad_class, "Class 9"), (broken, "Nursery")] {
            store
                .add_enrollment(Enrollment {
                    student_id: id,
                    class_enrolled: class.to_string(),
                    admission_date: date(2024, 4, 10),
                    is_active: true,
                })
                .await;
        }
        store.fail_inserts_for(broken).await;

        let service = service(store.clone(), AdmissionFeeRule::default());
        let report = service.backfill().await.unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.generated, 12);
        assert_eq!(report.succeeded(), 1);
        let failed: Vec<_> = report.failures.iter().map(|f| f.student_id).collect();
        assert!(failed.contains(&bad_class));
        assert!(failed.contains(&broken));

        // a second run only retries the students still without fees
        let again = service.backfill().await.unwrap();
        assert_eq!(again.processed, 2);
    }

    #[tokio::test]
    async fn test_record_payment_updates_status_and_statement() {
        let store = Arc::new(InMemoryFeeStore::with_settings(settings()));
        let schedule = service(store.clone(), AdmissionFeeRule::FinancialYearStart);
        let payments = FeePaymentService::new(store.clone());
        let student = StudentId::new();

        schedule
            .generate_for_admission(student, "Class 5", date(2024, 4, 1))
            .await
            .unwrap();
        let april = store.list_for_student(student).await.unwrap().remove(0);

        let (updated, receipt) = payments
            .record_payment(
                april.id,
                RecordPayment {
                    amount: inr(dec!(7000)),
                    method: PaymentMethod::Cash,
                    paid_on: date(2024, 4, 5),
                    remarks: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, FeeStatus::Paid);
        assert!(receipt.receipt_number.starts_with("RCPT-202404-"));
        assert_eq!(payments.list_payments(april.id).await.unwrap().len(), 1);

        let statement = payments
            .statement(student, Currency::INR, date(2024, 6, 15))
            .await
            .unwrap();
        assert_eq!(statement.total_due.amount(), dec!(62000));
        assert_eq!(statement.total_paid.amount(), dec!(7000));
        assert_eq!(statement.balance.amount(), dec!(55000));
        // May and June are past due and unpaid
        assert_eq!(statement.overdue_count, 2);
    }

    #[tokio::test]
    async fn test_overpayment_is_rejected() {
        let store = Arc::new(InMemoryFeeStore::with_settings(settings()));
        let schedule = service(store.clone(), AdmissionFeeRule::FinancialYearStart);
        let payments = FeePaymentService::new(store.clone());
        let student = StudentId::new();

        schedule
            .generate_for_admission(student, "Nursery", date(2024, 4, 1))
            .await
            .unwrap();
        let may = store.list_for_student(student).await.unwrap().remove(1);

        let result = payments
            .record_payment(
                may.id,
                RecordPayment {
                    amount: inr(dec!(3500)),
                    method: PaymentMethod::Upi,
                    paid_on: date(2024, 5, 2),
                    remarks: None,
                },
            )
            .await;
        assert!(matches!(result, Err(FeeError::InvalidPayment(_))));
    }

    #[tokio::test]
    async fn test_payment_for_unknown_obligation() {
        let store = Arc::new(InMemoryFeeStore::new());
        let payments = FeePaymentService::new(store);

        let result = payments.list_payments(FeeObligationId::new()).await;
        assert!(matches!(result, Err(FeeError::ObligationNotFound(_))));
    }
}
