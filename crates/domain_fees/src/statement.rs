//! Per-student fee statement

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, StudentId};

use crate::error::FeeError;
use crate::obligation::MonthlyFeeObligation;

/// Totals over all of a student's obligations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStatement {
    pub student_id: StudentId,
    pub as_of: NaiveDate,
    pub total_due: Money,
    pub total_paid: Money,
    pub balance: Money,
    pub overdue_count: usize,
    /// Obligations ordered by due date
    pub obligations: Vec<MonthlyFeeObligation>,
}

impl FeeStatement {
    pub fn from_obligations(
        student_id: StudentId,
        mut obligations: Vec<MonthlyFeeObligation>,
        currency: Currency,
        as_of: NaiveDate,
    ) -> Result<Self, FeeError> {
        obligations.sort_by_key(|o| o.due_date);

        let total_due = Money::sum(obligations.iter().map(|o| &o.total_amount), currency)?;
        let total_paid = Money::sum(obligations.iter().map(|o| &o.paid_amount), currency)?;
        let balance = total_due.checked_sub(&total_paid)?;
        let overdue_count = obligations.iter().filter(|o| o.is_overdue(as_of)).count();

        Ok(Self {
            student_id,
            as_of,
            total_due,
            total_paid,
            balance,
            overdue_count,
            obligations,
        })
    }
}
