//! Fee repository implementation
//!
//! Monthly fee obligations, their payments, and the enrollment view the
//! schedule generator reads.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const FEE_COLUMNS: &str = "fee_id, student_id, month, year, tuition_fee, admission_fee, \
    total_amount, paid_amount, currency, due_date, status, paid_date, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "payment_id, fee_id, student_id, receipt_number, amount, \
    currency, method, paid_on, remarks, created_at";

/// A row of the `monthly_fees` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MonthlyFeeRow {
    pub fee_id: Uuid,
    pub student_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub tuition_fee: Decimal,
    pub admission_fee: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub paid_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the `fee_payments` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FeePaymentRow {
    pub payment_id: Uuid,
    pub fee_id: Uuid,
    pub student_id: Uuid,
    pub receipt_number: String,
    pub amount: Decimal,
    pub currency: String,
    pub method: String,
    pub paid_on: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The columns of `students` the fee services need
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EnrollmentRow {
    pub student_id: Uuid,
    pub class_enrolled: String,
    pub admission_date: NaiveDate,
    pub is_active: bool,
}

/// (month, year) of a freshly inserted obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct InsertedPeriod {
    pub month: i32,
    pub year: i32,
}

/// Repository for fee obligations and payments
#[derive(Debug, Clone)]
pub struct FeeRepository {
    pool: PgPool,
}

impl FeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts all rows in one statement
    ///
    /// Rows whose (student_id, month, year) already exists are skipped by
    /// the unique constraint; only the periods actually written come back.
    pub async fn insert_skipping_duplicates(
        &self,
        rows: &[MonthlyFeeRow],
    ) -> Result<Vec<InsertedPeriod>, DatabaseError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO monthly_fees ({}) ",
            FEE_COLUMNS
        ));
        builder.push_values(rows, |mut b, row| {
            b.push_bind(row.fee_id)
                .push_bind(row.student_id)
                .push_bind(row.month)
                .push_bind(row.year)
                .push_bind(row.tuition_fee)
                .push_bind(row.admission_fee)
                .push_bind(row.total_amount)
                .push_bind(row.paid_amount)
                .push_bind(row.currency.clone())
                .push_bind(row.due_date)
                .push_bind(row.status.clone())
                .push_bind(row.paid_date)
                .push_bind(row.created_at)
                .push_bind(row.updated_at);
        });
        builder.push(
            " ON CONFLICT ON CONSTRAINT uq_monthly_fees_student_period DO NOTHING \
             RETURNING month, year",
        );

        let mut inserted = builder
            .build_query_as::<InsertedPeriod>()
            .fetch_all(&self.pool)
            .await?;
        inserted.sort_by_key(|p| (p.year, p.month));
        Ok(inserted)
    }

    /// All obligations of a student, ordered by due date
    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<MonthlyFeeRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, MonthlyFeeRow>(&format!(
            "SELECT {} FROM monthly_fees WHERE student_id = $1 ORDER BY due_date",
            FEE_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get(&self, fee_id: Uuid) -> Result<MonthlyFeeRow, DatabaseError> {
        sqlx::query_as::<_, MonthlyFeeRow>(&format!(
            "SELECT {} FROM monthly_fees WHERE fee_id = $1",
            FEE_COLUMNS
        ))
        .bind(fee_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("MonthlyFee", fee_id))
    }

    /// Writes the new paid state of an obligation and its payment row
    /// in one transaction
    ///
    /// The obligation row is locked first; if its paid amount no longer
    /// equals `expected_paid` the transaction is abandoned with
    /// [`DatabaseError::Conflict`].
    pub async fn record_payment(
        &self,
        updated: &MonthlyFeeRow,
        expected_paid: Decimal,
        payment: &FeePaymentRow,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<Decimal> = sqlx::query_scalar(
            "SELECT paid_amount FROM monthly_fees WHERE fee_id = $1 FOR UPDATE",
        )
        .bind(updated.fee_id)
        .fetch_optional(&mut *tx)
        .await?;

        match current {
            None => return Err(DatabaseError::not_found("MonthlyFee", updated.fee_id)),
            Some(paid) if paid != expected_paid => {
                return Err(DatabaseError::Conflict(format!(
                    "fee {} paid amount changed from {} to {}",
                    updated.fee_id, expected_paid, paid
                )));
            }
            Some(_) => {}
        }

        sqlx::query(
            r#"
            UPDATE monthly_fees
            SET paid_amount = $2, status = $3, paid_date = $4, updated_at = $5
            WHERE fee_id = $1
            "#,
        )
        .bind(updated.fee_id)
        .bind(updated.paid_amount)
        .bind(&updated.status)
        .bind(updated.paid_date)
        .bind(updated.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "INSERT INTO fee_payments ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            PAYMENT_COLUMNS
        ))
        .bind(payment.payment_id)
        .bind(payment.fee_id)
        .bind(payment.student_id)
        .bind(&payment.receipt_number)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.method)
        .bind(payment.paid_on)
        .bind(&payment.remarks)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Payments against one obligation, oldest first
    pub async fn list_payments(&self, fee_id: Uuid) -> Result<Vec<FeePaymentRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, FeePaymentRow>(&format!(
            "SELECT {} FROM fee_payments WHERE fee_id = $1 ORDER BY created_at",
            PAYMENT_COLUMNS
        ))
        .bind(fee_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_enrollment(&self, student_id: Uuid) -> Result<EnrollmentRow, DatabaseError> {
        sqlx::query_as::<_, EnrollmentRow>(
            "SELECT student_id, class_enrolled, admission_date, is_active \
             FROM students WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Student", student_id))
    }

    /// Active students that have no rows in `monthly_fees`
    pub async fn enrollments_without_fees(&self) -> Result<Vec<EnrollmentRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT s.student_id, s.class_enrolled, s.admission_date, s.is_active
            FROM students s
            WHERE s.is_active
              AND NOT EXISTS (SELECT 1 FROM monthly_fees f WHERE f.student_id = s.student_id)
            ORDER BY s.admission_date, s.admission_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
