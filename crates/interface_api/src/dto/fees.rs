//! Fee DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, FinancialYear, Money};
use domain_fees::{FeePayment, FeeStatement, FeeStatus, MonthlyFeeObligation, PaymentMethod};

use crate::error::ApiError;

/// Academic year given as a start year (`2024`) or a label (`"2024-25"`)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AcademicYear {
    StartYear(i32),
    Label(String),
}

impl AcademicYear {
    pub fn to_financial_year(&self) -> Result<FinancialYear, ApiError> {
        let parsed = match self {
            AcademicYear::StartYear(year) => FinancialYear::new(*year),
            AcademicYear::Label(label) => label.parse(),
        };
        parsed.map_err(|e| ApiError::validation(format!("academicYear: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFeesRequest {
    pub student_id: Uuid,
    pub academic_year: Option<AcademicYear>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub method: PaymentMethod,
    /// Defaults to today in the school's timezone
    pub paid_on: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementQuery {
    /// Date overdue counts are computed against; defaults to today
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObligationResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub tuition_fee: Decimal,
    pub admission_fee: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_due: Decimal,
    pub currency: Currency,
    pub due_date: NaiveDate,
    pub status: FeeStatus,
    pub paid_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl From<MonthlyFeeObligation> for ObligationResponse {
    fn from(obligation: MonthlyFeeObligation) -> Self {
        Self {
            id: obligation.id.into(),
            student_id: obligation.student_id.into(),
            month: obligation.month,
            year: obligation.year,
            tuition_fee: obligation.tuition_fee.amount(),
            admission_fee: obligation.admission_fee.amount(),
            total_amount: obligation.total_amount.amount(),
            paid_amount: obligation.paid_amount.amount(),
            balance_due: obligation.balance_due().amount(),
            currency: obligation.total_amount.currency(),
            due_date: obligation.due_date,
            status: obligation.status,
            paid_date: obligation.paid_date,
            updated_at: obligation.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: Uuid,
    pub obligation_id: Uuid,
    pub receipt_number: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FeePayment> for PaymentResponse {
    fn from(payment: FeePayment) -> Self {
        Self {
            id: payment.id.into(),
            obligation_id: payment.obligation_id.into(),
            receipt_number: payment.receipt_number,
            amount: payment.amount.amount(),
            currency: payment.amount.currency(),
            method: payment.method,
            paid_on: payment.paid_on,
            remarks: payment.remarks,
            created_at: payment.created_at,
        }
    }
}

/// Payment receipt together with the updated obligation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceiptResponse {
    pub payment: PaymentResponse,
    pub obligation: ObligationResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    pub student_id: Uuid,
    pub as_of: NaiveDate,
    pub currency: Currency,
    pub total_due: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
    pub overdue_count: usize,
    pub obligations: Vec<ObligationResponse>,
}

impl From<FeeStatement> for StatementResponse {
    fn from(statement: FeeStatement) -> Self {
        Self {
            student_id: statement.student_id.into(),
            as_of: statement.as_of,
            currency: statement.total_due.currency(),
            total_due: statement.total_due.amount(),
            total_paid: statement.total_paid.amount(),
            balance: statement.balance.amount(),
            overdue_count: statement.overdue_count,
            obligations: statement.obligations.into_iter().map(Into::into).collect(),
        }
    }
}

/// Converts a request amount into the school's currency
pub fn to_money(amount: Decimal, currency: Currency, field: &str) -> Result<Money, ApiError> {
    Money::non_negative(amount, currency).map_err(|e| ApiError::validation(format!("{}: {}", field, e)))
}
