//! Expense DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_expenses::{Expense, ExpenseCategory, ExpenseQuery, NewExpense};

use crate::dto::fees::to_money;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub category: ExpenseCategory,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    #[validate(length(max = 200))]
    pub paid_to: Option<String>,
}

impl CreateExpenseRequest {
    pub fn into_expense(self, currency: Currency) -> Result<NewExpense, ApiError> {
        Ok(NewExpense {
            category: self.category,
            description: self.description,
            amount: to_money(self.amount, currency, "amount")?,
            expense_date: self.expense_date,
            paid_to: self.paid_to,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilterQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
}

impl ExpenseFilterQuery {
    pub fn into_query(self) -> Result<ExpenseQuery, ApiError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ApiError::validation(format!(
                    "from ({}) is after to ({})",
                    from, to
                )));
            }
        }
        Ok(ExpenseQuery {
            from: self.from,
            to: self.to,
            category: self.category,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub expense_date: NaiveDate,
    pub paid_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id.into(),
            category: expense.category,
            description: expense.description,
            amount: expense.amount.amount(),
            currency: expense.amount.currency(),
            expense_date: expense.expense_date,
            paid_to: expense.paid_to,
            created_at: expense.created_at,
        }
    }
}
