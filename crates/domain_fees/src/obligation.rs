//! Monthly fee obligations
//!
//! One obligation is what a student owes for one calendar month of a
//! financial year. Obligations are created by the schedule generator and
//! afterwards only change through payments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{FeeObligationId, FeePeriod, Money, StudentId};

use crate::error::FeeError;

/// Payment status of an obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeStatus {
    /// Nothing paid yet
    Pending,
    /// Some but not all of the total has been paid
    PartiallyPaid,
    /// Fully paid
    Paid,
}

impl FeeStatus {
    /// Status for a given paid amount against a total
    pub fn for_amounts(paid: &Money, total: &Money) -> Self {
        if paid.amount() >= total.amount() && !paid.is_negative() {
            FeeStatus::Paid
        } else if paid.is_positive() {
            FeeStatus::PartiallyPaid
        } else {
            FeeStatus::Pending
        }
    }

    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Pending => "PENDING",
            FeeStatus::PartiallyPaid => "PARTIALLY_PAID",
            FeeStatus::Paid => "PAID",
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeStatus {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(FeeStatus::Pending),
            "PARTIALLY_PAID" => Ok(FeeStatus::PartiallyPaid),
            "PAID" => Ok(FeeStatus::Paid),
            other => Err(FeeError::Persistence(format!("unknown fee status '{}'", other))),
        }
    }
}

/// An obligation computed by the generator but not yet stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeeObligation {
    pub student_id: StudentId,
    pub period: FeePeriod,
    pub tuition_fee: Money,
    pub admission_fee: Money,
}

impl NewFeeObligation {
    pub fn month(&self) -> u32 {
        self.period.month()
    }

    pub fn year(&self) -> i32 {
        self.period.year()
    }

    /// Tuition plus the admission component
    pub fn total_amount(&self) -> Money {
        self.tuition_fee + self.admission_fee
    }

    /// First day of the period
    pub fn due_date(&self) -> NaiveDate {
        self.period.due_date()
    }

    /// Turns the computed record into a stored, unpaid obligation
    pub fn into_obligation(self, id: FeeObligationId, created_at: DateTime<Utc>) -> MonthlyFeeObligation {
        let total_amount = self.total_amount();
        MonthlyFeeObligation {
            id,
            student_id: self.student_id,
            month: self.period.month(),
            year: self.period.year(),
            tuition_fee: self.tuition_fee,
            admission_fee: self.admission_fee,
            total_amount,
            paid_amount: Money::zero(total_amount.currency()),
            due_date: self.period.due_date(),
            status: FeeStatus::Pending,
            paid_date: None,
            created_at,
            updated_at: created_at,
        }
    }
}

/// A stored monthly fee obligation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFeeObligation {
    /// Unique identifier
    pub id: FeeObligationId,
    /// Student the fee is owed by
    pub student_id: StudentId,
    /// Calendar month, 1-12
    pub month: u32,
    /// Calendar year the due date falls in
    pub year: i32,
    /// Monthly tuition copied from the class rate at generation time
    pub tuition_fee: Money,
    /// Admission fee component, zero on all but one month
    pub admission_fee: Money,
    /// Tuition plus admission component
    pub total_amount: Money,
    /// Amount received so far
    pub paid_amount: Money,
    /// First day of the month
    pub due_date: NaiveDate,
    /// Payment status
    pub status: FeeStatus,
    /// Date of the most recent payment
    pub paid_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlyFeeObligation {
    /// The obligation's fee period
    pub fn period(&self) -> Result<FeePeriod, FeeError> {
        Ok(FeePeriod::new(self.month, self.year)?)
    }

    /// Amount still owed
    pub fn balance_due(&self) -> Money {
        self.total_amount - self.paid_amount
    }

    /// Returns true if the due date has passed and the fee is not fully paid
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date && self.status != FeeStatus::Paid
    }

    /// Applies a payment
    ///
    /// The amount must be positive and must not exceed the outstanding
    /// balance.
    pub fn apply_payment(&mut self, amount: Money, paid_on: NaiveDate) -> Result<(), FeeError> {
        if !amount.is_positive() {
            return Err(FeeError::InvalidPayment(
                "payment amount must be positive".to_string(),
            ));
        }

        let balance = self.balance_due();
        if amount.currency() != balance.currency() {
            return Err(FeeError::InvalidPayment(format!(
                "payment in {} for a fee charged in {}",
                amount.currency(),
                balance.currency()
            )));
        }
        if amount.amount() > balance.amount() {
            return Err(FeeError::InvalidPayment(format!(
                "payment of {} exceeds the outstanding balance of {}",
                amount, balance
            )));
        }

        self.paid_amount = self.paid_amount.checked_add(&amount)?;
        self.status = FeeStatus::for_amounts(&self.paid_amount, &self.total_amount);
        self.paid_date = Some(paid_on);
        self.updated_at = Utc::now();
        Ok(())
    }
}
