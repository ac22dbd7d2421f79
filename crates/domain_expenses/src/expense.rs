//! Expense records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ExpenseId, Money};

use crate::error::ExpenseError;

/// What the money was spent on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Salary,
    Utilities,
    Maintenance,
    Transport,
    Supplies,
    Events,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Salary,
        ExpenseCategory::Utilities,
        ExpenseCategory::Maintenance,
        ExpenseCategory::Transport,
        ExpenseCategory::Supplies,
        ExpenseCategory::Events,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Salary => "SALARY",
            ExpenseCategory::Utilities => "UTILITIES",
            ExpenseCategory::Maintenance => "MAINTENANCE",
            ExpenseCategory::Transport => "TRANSPORT",
            ExpenseCategory::Supplies => "SUPPLIES",
            ExpenseCategory::Events => "EVENTS",
            ExpenseCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = ExpenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ExpenseError::invalid(format!("unknown expense category '{}'", s)))
    }
}

/// An expense about to be recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Money,
    pub expense_date: NaiveDate,
    pub paid_to: Option<String>,
}

impl NewExpense {
    /// Amount must be positive and description non-empty
    pub fn validate(&self) -> Result<(), ExpenseError> {
        if self.description.trim().is_empty() {
            return Err(ExpenseError::invalid("description is required"));
        }
        if !self.amount.is_positive() {
            return Err(ExpenseError::invalid(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Money,
    pub expense_date: NaiveDate,
    pub paid_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn record(id: ExpenseId, new: NewExpense) -> Self {
        Self {
            id,
            category: new.category,
            description: new.description.trim().to_string(),
            amount: new.amount,
            expense_date: new.expense_date,
            paid_to: new.paid_to.filter(|p| !p.trim().is_empty()),
            created_at: Utc::now(),
        }
    }
}
