//! Fee payments and receipts

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{FeeObligationId, FeePaymentId, Money, StudentId};

use crate::error::FeeError;

/// How a fee was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Upi,
    BankTransfer,
    Cheque,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Cheque => "CHEQUE",
            PaymentMethod::Card => "CARD",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "UPI" => Ok(PaymentMethod::Upi),
            "BANK_TRANSFER" => Ok(PaymentMethod::BankTransfer),
            "CHEQUE" => Ok(PaymentMethod::Cheque),
            "CARD" => Ok(PaymentMethod::Card),
            other => Err(FeeError::InvalidPayment(format!("unknown payment method '{}'", other))),
        }
    }
}

/// Request to record a payment against an obligation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    pub remarks: Option<String>,
}

/// A recorded payment with its receipt number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePayment {
    /// Unique identifier
    pub id: FeePaymentId,
    /// Obligation the payment settles
    pub obligation_id: FeeObligationId,
    /// Student who paid
    pub student_id: StudentId,
    /// Human-readable receipt number (RCPT-YYYYMM-xxxxxx)
    pub receipt_number: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FeePayment {
    /// Creates a payment record for an obligation
    pub fn new(obligation_id: FeeObligationId, student_id: StudentId, request: RecordPayment) -> Self {
        let id = FeePaymentId::new_v7();
        Self {
            receipt_number: receipt_number(&id, request.paid_on),
            id,
            obligation_id,
            student_id,
            amount: request.amount,
            method: request.method,
            paid_on: request.paid_on,
            remarks: request.remarks.filter(|r| !r.trim().is_empty()),
            created_at: Utc::now(),
        }
    }
}

/// Receipt numbers combine the payment month with the tail of the id
fn receipt_number(id: &FeePaymentId, paid_on: NaiveDate) -> String {
    let simple = id.as_uuid().simple().to_string();
    let tail = &simple[simple.len() - 6..];
    format!(
        "RCPT-{:04}{:02}-{}",
        paid_on.year(),
        paid_on.month(),
        tail.to_uppercase()
    )
}
