//! Expense summaries

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, FeePeriod, Money};

use crate::error::ExpenseError;
use crate::expense::{Expense, ExpenseCategory};

/// Spending in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpenseTotal {
    pub month: u32,
    pub year: i32,
    pub total: Money,
    pub by_category: BTreeMap<ExpenseCategory, Money>,
}

/// Totals per month, per category and overall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    /// Months in chronological order; months without spending are omitted
    pub months: Vec<MonthlyExpenseTotal>,
    pub by_category: BTreeMap<ExpenseCategory, Money>,
    pub total: Money,
}

impl ExpenseSummary {
    pub fn by_month(expenses: &[Expense], currency: Currency) -> Result<Self, ExpenseError> {
        let zero = Money::zero(currency);
        let mut months: BTreeMap<FeePeriod, MonthlyExpenseTotal> = BTreeMap::new();
        let mut by_category: BTreeMap<ExpenseCategory, Money> = BTreeMap::new();
        let mut total = zero;

        for expense in expenses {
            let period = FeePeriod::containing(expense.expense_date);
            let month = months.entry(period).or_insert_with(|| MonthlyExpenseTotal {
                month: period.month(),
                year: period.year(),
                total: zero,
                by_category: BTreeMap::new(),
            });

            month.total = month.total.checked_add(&expense.amount)?;
            let slot = month.by_category.entry(expense.category).or_insert(zero);
            *slot = slot.checked_add(&expense.amount)?;

            let slot = by_category.entry(expense.category).or_insert(zero);
            *slot = slot.checked_add(&expense.amount)?;

            total = total.checked_add(&expense.amount)?;
        }

        Ok(Self {
            months: months.into_values().collect(),
            by_category,
            total,
        })
    }
}
