//! PostgreSQL Fee Adapter
//!
//! Implements `FeeObligationPort` and `EnrollmentPort` over the
//! [`FeeRepository`]. Schedule inserts rely on the
//! `uq_monthly_fees_student_period` constraint to skip months that already
//! exist, which keeps generation idempotent even when two requests race.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{
    Currency, DomainPort, FeeObligationId, FeePaymentId, FeePeriod, HealthCheckResult,
    HealthCheckable, Money, PortError, StudentId,
};
use domain_fees::{
    Enrollment, EnrollmentPort, FeeObligationPort, FeePayment, FeeStatus, MonthlyFeeObligation,
    NewFeeObligation, PaymentMethod,
};

use super::parse_currency;
use crate::error::DatabaseError;
use crate::repositories::fees::{EnrollmentRow, FeePaymentRow, FeeRepository, MonthlyFeeRow};

/// PostgreSQL-backed fee obligation and enrollment storage
#[derive(Debug, Clone)]
pub struct PostgresFeeAdapter {
    repository: FeeRepository,
    pool: PgPool,
}

impl PostgresFeeAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: FeeRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresFeeAdapter {}

#[async_trait]
impl HealthCheckable for PostgresFeeAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-fee-adapter").await
    }
}

#[async_trait]
impl FeeObligationPort for PostgresFeeAdapter {
    #[instrument(skip(self, obligations), fields(count = obligations.len()))]
    async fn insert_skipping_duplicates(
        &self,
        obligations: Vec<NewFeeObligation>,
    ) -> Result<Vec<FeePeriod>, PortError> {
        let now = chrono::Utc::now();
        let rows: Vec<MonthlyFeeRow> = obligations
            .into_iter()
            .map(|o| obligation_to_row(&o.into_obligation(FeeObligationId::new_v7(), now)))
            .collect();

        let inserted = self.repository.insert_skipping_duplicates(&rows).await?;
        debug!(inserted = inserted.len(), requested = rows.len(), "Fee rows written");

        inserted
            .into_iter()
            .map(|p| {
                FeePeriod::new(p.month as u32, p.year)
                    .map_err(|e| PortError::from(DatabaseError::invalid_data(e.to_string())))
            })
            .collect()
    }

    #[instrument(skip(self), fields(student_id = %student_id))]
    async fn list_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<MonthlyFeeObligation>, PortError> {
        let rows = self.repository.list_for_student(student_id.into()).await?;
        rows.into_iter()
            .map(|row| row_to_obligation(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self), fields(fee_id = %id))]
    async fn get_obligation(&self, id: FeeObligationId) -> Result<MonthlyFeeObligation, PortError> {
        let row = self.repository.get(id.into()).await?;
        Ok(row_to_obligation(row)?)
    }

    #[instrument(skip(self, updated, payment), fields(fee_id = %updated.id, receipt = %payment.receipt_number))]
    async fn record_payment(
        &self,
        updated: &MonthlyFeeObligation,
        expected_paid: Money,
        payment: &FeePayment,
    ) -> Result<(), PortError> {
        self.repository
            .record_payment(
                &obligation_to_row(updated),
                expected_paid.amount(),
                &payment_to_row(payment),
            )
            .await?;
        info!(amount = %payment.amount, status = %updated.status, "Payment stored");
        Ok(())
    }

    #[instrument(skip(self), fields(fee_id = %obligation_id))]
    async fn list_payments(&self, obligation_id: FeeObligationId) -> Result<Vec<FeePayment>, PortError> {
        let rows = self.repository.list_payments(obligation_id.into()).await?;
        rows.into_iter()
            .map(|row| row_to_payment(row).map_err(PortError::from))
            .collect()
    }
}

#[async_trait]
impl EnrollmentPort for PostgresFeeAdapter {
    #[instrument(skip(self), fields(student_id = %student_id))]
    async fn get_enrollment(&self, student_id: StudentId) -> Result<Enrollment, PortError> {
        let row = self.repository.get_enrollment(student_id.into()).await?;
        Ok(row_to_enrollment(row))
    }

    #[instrument(skip(self))]
    async fn enrollments_without_fees(&self) -> Result<Vec<Enrollment>, PortError> {
        let rows = self.repository.enrollments_without_fees().await?;
        debug!(count = rows.len(), "Students without fees");
        Ok(rows.into_iter().map(row_to_enrollment).collect())
    }
}

fn obligation_to_row(obligation: &MonthlyFeeObligation) -> MonthlyFeeRow {
    MonthlyFeeRow {
        fee_id: obligation.id.into(),
        student_id: obligation.student_id.into(),
        month: obligation.month as i32,
        year: obligation.year,
        tuition_fee: obligation.tuition_fee.amount(),
        admission_fee: obligation.admission_fee.amount(),
        total_amount: obligation.total_amount.amount(),
        paid_amount: obligation.paid_amount.amount(),
        currency: obligation.total_amount.currency().code().to_string(),
        due_date: obligation.due_date,
        status: obligation.status.as_str().to_string(),
        paid_date: obligation.paid_date,
        created_at: obligation.created_at,
        updated_at: obligation.updated_at,
    }
}

fn row_to_obligation(row: MonthlyFeeRow) -> Result<MonthlyFeeObligation, DatabaseError> {
    let currency = parse_currency(&row.currency)?;
    let money = |amount| Money::new(amount, currency);
    let status = row
        .status
        .parse::<FeeStatus>()
        .map_err(|e| DatabaseError::invalid_data(e.to_string()))?;
    if !(1..=12).contains(&row.month) {
        return Err(DatabaseError::invalid_data(format!("month {} out of range", row.month)));
    }

    Ok(MonthlyFeeObligation {
        id: FeeObligationId::from_uuid(row.fee_id),
        student_id: StudentId::from_uuid(row.student_id),
        month: row.month as u32,
        year: row.year,
        tuition_fee: money(row.tuition_fee),
        admission_fee: money(row.admission_fee),
        total_amount: money(row.total_amount),
        paid_amount: money(row.paid_amount),
        due_date: row.due_date,
        status,
        paid_date: row.paid_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn payment_to_row(payment: &FeePayment) -> FeePaymentRow {
    FeePaymentRow {
        payment_id: payment.id.into(),
        fee_id: payment.obligation_id.into(),
        student_id: payment.student_id.into(),
        receipt_number: payment.receipt_number.clone(),
        amount: payment.amount.amount(),
        currency: payment.amount.currency().code().to_string(),
        method: payment.method.as_str().to_string(),
        paid_on: payment.paid_on,
        remarks: payment.remarks.clone(),
        created_at: payment.created_at,
    }
}

fn row_to_payment(row: FeePaymentRow) -> Result<FeePayment, DatabaseError> {
    let currency: Currency = parse_currency(&row.currency)?;
    let method = row
        .method
        .parse::<PaymentMethod>()
        .map_err(|e| DatabaseError::invalid_data(e.to_string()))?;

    Ok(FeePayment {
        id: FeePaymentId::from_uuid(row.payment_id),
        obligation_id: FeeObligationId::from_uuid(row.fee_id),
        student_id: StudentId::from_uuid(row.student_id),
        receipt_number: row.receipt_number,
        amount: Money::new(row.amount, currency),
        method,
        paid_on: row.paid_on,
        remarks: row.remarks,
        created_at: row.created_at,
    })
}

fn row_to_enrollment(row: EnrollmentRow) -> Enrollment {
    Enrollment {
        student_id: StudentId::from_uuid(row.student_id),
        class_enrolled: row.class_enrolled,
        admission_date: row.admission_date,
        is_active: row.is_active,
    }
}
