//! Fees Domain Ports
//!
//! Port interfaces the fee services depend on. Production adapters live in
//! `infra_db`; the in-memory [`mock::InMemoryFeeStore`] implements all three
//! for tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_fees::{FeeScheduleService, AdmissionFeeRule};
//! use std::sync::Arc;
//!
//! let service = FeeScheduleService::new(
//!     settings_port,      // Arc<dyn FeeSettingsPort>
//!     obligation_port,    // Arc<dyn FeeObligationPort>
//!     enrollment_port,    // Arc<dyn EnrollmentPort>
//!     AdmissionFeeRule::AdmissionMonth,
//! );
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{
    Currency, DomainPort, FeeObligationId, FeePeriod, HealthCheckable, Money, PortError, StudentId,
};

use crate::obligation::{MonthlyFeeObligation, NewFeeObligation};
use crate::payment::FeePayment;
use crate::settings::{ClassFeeTable, FeeSettings, TransportFeeBands};

/// What the fee services need to know about an enrolled student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub class_enrolled: String,
    pub admission_date: NaiveDate,
    pub is_active: bool,
}

/// Access to the school's fee settings
#[async_trait]
pub trait FeeSettingsPort: DomainPort + HealthCheckable {
    /// Loads the current settings, or `None` if the school has none yet
    async fn load_settings(&self) -> Result<Option<FeeSettings>, PortError>;

    /// Replaces the class rate table, creating the settings record in
    /// `currency` if it does not exist
    async fn save_class_fees(
        &self,
        currency: Currency,
        class_fees: ClassFeeTable,
    ) -> Result<FeeSettings, PortError>;

    /// Replaces the transport fee bands, creating the settings record in
    /// `currency` if it does not exist
    async fn save_transport_bands(
        &self,
        currency: Currency,
        bands: TransportFeeBands,
    ) -> Result<FeeSettings, PortError>;
}

/// Storage for monthly fee obligations and their payments
#[async_trait]
pub trait FeeObligationPort: DomainPort + HealthCheckable {
    /// Inserts obligations in one call, skipping any whose
    /// (student, month, year) already exists
    ///
    /// Returns the periods that were actually inserted.
    async fn insert_skipping_duplicates(
        &self,
        obligations: Vec<NewFeeObligation>,
    ) -> Result<Vec<FeePeriod>, PortError>;

    /// All obligations of a student, ordered by due date
    async fn list_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<MonthlyFeeObligation>, PortError>;

    async fn get_obligation(&self, id: FeeObligationId) -> Result<MonthlyFeeObligation, PortError>;

    /// Stores the updated obligation together with its payment record
    ///
    /// The write only applies if the stored paid amount still equals
    /// `expected_paid`; otherwise `PortError::Conflict` is returned and
    /// nothing changes.
    async fn record_payment(
        &self,
        updated: &MonthlyFeeObligation,
        expected_paid: Money,
        payment: &FeePayment,
    ) -> Result<(), PortError>;

    /// Payments recorded against an obligation, oldest first
    async fn list_payments(&self, obligation_id: FeeObligationId) -> Result<Vec<FeePayment>, PortError>;
}

/// Read access to student enrollments
#[async_trait]
pub trait EnrollmentPort: DomainPort + HealthCheckable {
    async fn get_enrollment(&self, student_id: StudentId) -> Result<Enrollment, PortError>;

    /// Active students with no fee obligations at all
    async fn enrollments_without_fees(&self) -> Result<Vec<Enrollment>, PortError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory store implementing every fee port
    ///
    /// Enforces the (student, month, year) uniqueness the database applies,
    /// and can be told to fail inserts for particular students.
    #[derive(Debug, Default)]
    pub struct InMemoryFeeStore {
        settings: Arc<RwLock<Option<FeeSettings>>>,
        obligations: Arc<RwLock<HashMap<FeeObligationId, MonthlyFeeObligation>>>,
        payments: Arc<RwLock<Vec<FeePayment>>>,
        enrollments: Arc<RwLock<HashMap<StudentId, Enrollment>>>,
        failing_students: Arc<RwLock<HashSet<StudentId>>>,
    }

    impl InMemoryFeeStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a store pre-loaded with settings
        pub fn with_settings(settings: FeeSettings) -> Self {
            Self {
                settings: Arc::new(RwLock::new(Some(settings))),
                ..Self::default()
            }
        }

        pub async fn add_enrollment(&self, enrollment: Enrollment) {
            self.enrollments
                .write()
                .await
                .insert(enrollment.student_id, enrollment);
        }

        /// Makes every insert for this student fail with a connection error
        pub async fn fail_inserts_for(&self, student_id: StudentId) {
            self.failing_students.write().await.insert(student_id);
        }

        /// Number of stored obligations across all students
        pub async fn obligation_count(&self) -> usize {
            self.obligations.read().await.len()
        }

        async fn current_or_new(&self, currency: Currency) -> FeeSettings {
            self.settings
                .read()
                .await
                .clone()
                .unwrap_or_else(|| FeeSettings::new(currency))
        }
    }

    impl DomainPort for InMemoryFeeStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryFeeStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-fee-store")
        }
    }

    #[async_trait]
    impl FeeSettingsPort for InMemoryFeeStore {
        async fn load_settings(&self) -> Result<Option<FeeSettings>, PortError> {
            Ok(self.settings.read().await.clone())
        }

        async fn save_class_fees(
            &self,
            currency: Currency,
            class_fees: ClassFeeTable,
        ) -> Result<FeeSettings, PortError> {
            let updated = self
                .current_or_new(currency)
                .await
                .with_class_fees(class_fees)
                .map_err(|e| PortError::validation(e.to_string()))?;
            *self.settings.write().await = Some(updated.clone());
            Ok(updated)
        }

        async fn save_transport_bands(
            &self,
            currency: Currency,
            bands: TransportFeeBands,
        ) -> Result<FeeSettings, PortError> {
            let updated = self
                .current_or_new(currency)
                .await
                .with_transport_bands(bands)
                .map_err(|e| PortError::validation(e.to_string()))?;
            *self.settings.write().await = Some(updated.clone());
            Ok(updated)
        }
    }

    #[async_trait]
    impl FeeObligationPort for InMemoryFeeStore {
        async fn insert_skipping_duplicates(
            &self,
            obligations: Vec<NewFeeObligation>,
        ) -> Result<Vec<FeePeriod>, PortError> {
            {
                let failing = self.failing_students.read().await;
                if let Some(bad) = obligations.iter().find(|o| failing.contains(&o.student_id)) {
                    return Err(PortError::connection(format!(
                        "insert failed for student {}",
                        bad.student_id
                    )));
                }
            }

            let mut stored = self.obligations.write().await;
            let mut existing: HashSet<(StudentId, u32, i32)> = stored
                .values()
                .map(|o| (o.student_id, o.month, o.year))
                .collect();

            let now = Utc::now();
            let mut created = Vec::new();
            for obligation in obligations {
                let key = (obligation.student_id, obligation.month(), obligation.year());
                if !existing.insert(key) {
                    continue;
                }
                created.push(obligation.period);
                let id = FeeObligationId::new_v7();
                stored.insert(id, obligation.into_obligation(id, now));
            }
            Ok(created)
        }

        async fn list_for_student(
            &self,
            student_id: StudentId,
        ) -> Result<Vec<MonthlyFeeObligation>, PortError> {
            let mut list: Vec<_> = self
                .obligations
                .read()
                .await
                .values()
                .filter(|o| o.student_id == student_id)
                .cloned()
                .collect();
            list.sort_by_key(|o| o.due_date);
            Ok(list)
        }

        async fn get_obligation(&self, id: FeeObligationId) -> Result<MonthlyFeeObligation, PortError> {
            self.obligations
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("MonthlyFee", id))
        }

        async fn record_payment(
            &self,
            updated: &MonthlyFeeObligation,
            expected_paid: Money,
            payment: &FeePayment,
        ) -> Result<(), PortError> {
            let mut stored = self.obligations.write().await;
            let current = stored
                .get_mut(&updated.id)
                .ok_or_else(|| PortError::not_found("MonthlyFee", updated.id))?;

            if current.paid_amount != expected_paid {
                return Err(PortError::conflict(format!(
                    "fee {} was paid concurrently",
                    updated.id
                )));
            }

            *current = updated.clone();
            self.payments.write().await.push(payment.clone());
            Ok(())
        }

        async fn list_payments(&self, obligation_id: FeeObligationId) -> Result<Vec<FeePayment>, PortError> {
            Ok(self
                .payments
                .read()
                .await
                .iter()
                .filter(|p| p.obligation_id == obligation_id)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl EnrollmentPort for InMemoryFeeStore {
        async fn get_enrollment(&self, student_id: StudentId) -> Result<Enrollment, PortError> {
            self.enrollments
                .read()
                .await
                .get(&student_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Student", student_id))
        }

        async fn enrollments_without_fees(&self) -> Result<Vec<Enrollment>, PortError> {
            let with_fees: HashSet<StudentId> = self
                .obligations
                .read()
                .await
                .values()
                .map(|o| o.student_id)
                .collect();

            let mut pending: Vec<_> = self
                .enrollments
                .read()
                .await
                .values()
                .filter(|e| e.is_active && !with_fees.contains(&e.student_id))
                .cloned()
                .collect();
            pending.sort_by_key(|e| e.admission_date);
            Ok(pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryFeeStore;
    use super::*;
    use rust_decimal_macros::dec;

    fn new_obligation(student_id: StudentId, month: u32, year: i32) -> NewFeeObligation {
        NewFeeObligation {
            student_id,
            period: FeePeriod::new(month, year).unwrap(),
            tuition_fee: Money::new(dec!(1000), Currency::INR),
            admission_fee: Money::zero(Currency::INR),
        }
    }

    #[tokio::test]
    async fn test_mock_skips_existing_periods() {
        let store = InMemoryFeeStore::new();
        let student = StudentId::new();

        let first = store
            .insert_skipping_duplicates(vec![new_obligation(student, 4, 2024)])
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        let second = store
            .insert_skipping_duplicates(vec![
                new_obligation(student, 4, 2024),
                new_obligation(student, 5, 2024),
            ])
            .await
            .unwrap();
        assert_eq!(second, vec![FeePeriod::new(5, 2024).unwrap()]);
        assert_eq!(store.obligation_count().await, 2);
    }

    #[tokio::test]
    async fn test_mock_payment_conflict() {
        let store = InMemoryFeeStore::new();
        let student = StudentId::new();
        store
            .insert_skipping_duplicates(vec![new_obligation(student, 4, 2024)])
            .await
            .unwrap();
        let stored = store.list_for_student(student).await.unwrap().remove(0);

        let payment = FeePayment::new(
            stored.id,
            student,
            crate::payment::RecordPayment {
                amount: Money::new(dec!(100), Currency::INR),
                method: crate::payment::PaymentMethod::Cash,
                paid_on: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
                remarks: None,
            },
        );

        let stale = Money::new(dec!(50), Currency::INR);
        let result = store.record_payment(&stored, stale, &payment).await;
        assert!(matches!(result, Err(PortError::Conflict { .. })));
        assert!(store.list_payments(stored.id).await.unwrap().is_empty());
    }
}
