//! Expense application service

use std::sync::Arc;

use tracing::{info, instrument};

use core_kernel::{Currency, ExpenseId};

use crate::error::ExpenseError;
use crate::expense::{Expense, NewExpense};
use crate::ports::{ExpensePort, ExpenseQuery};
use crate::summary::ExpenseSummary;

pub struct ExpenseService {
    expenses: Arc<dyn ExpensePort>,
    currency: Currency,
}

impl ExpenseService {
    pub fn new(expenses: Arc<dyn ExpensePort>, currency: Currency) -> Self {
        Self { expenses, currency }
    }

    /// Validates and stores an expense in the school currency
    #[instrument(skip(self, expense), fields(category = %expense.category))]
    pub async fn record(&self, expense: NewExpense) -> Result<Expense, ExpenseError> {
        expense.validate()?;
        if expense.amount.currency() != self.currency {
            return Err(ExpenseError::invalid(format!(
                "expenses are recorded in {}, got {}",
                self.currency,
                expense.amount.currency()
            )));
        }

        let stored = self
            .expenses
            .create_expense(expense)
            .await
            .map_err(ExpenseError::from_port)?;
        info!(expense_id = %stored.id, amount = %stored.amount, "Expense recorded");
        Ok(stored)
    }

    pub async fn list(&self, query: ExpenseQuery) -> Result<Vec<Expense>, ExpenseError> {
        self.expenses
            .list_expenses(query)
            .await
            .map_err(ExpenseError::from_port)
    }

    pub async fn summary(&self, query: ExpenseQuery) -> Result<ExpenseSummary, ExpenseError> {
        let expenses = self.list(query).await?;
        ExpenseSummary::by_month(&expenses, self.currency)
    }

    pub async fn delete(&self, id: ExpenseId) -> Result<(), ExpenseError> {
        self.expenses
            .delete_expense(id)
            .await
            .map_err(ExpenseError::from_port)?;
        info!(expense_id = %id, "Expense deleted");
        Ok(())
    }
}
