//! Expenses Domain Ports

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, ExpenseId, HealthCheckable, PortError};

use crate::expense::{Expense, ExpenseCategory, NewExpense};

/// Filter for listing expenses; date bounds are inclusive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
}

impl ExpenseQuery {
    pub fn matches(&self, expense: &Expense) -> bool {
        self.from.map_or(true, |from| expense.expense_date >= from)
            && self.to.map_or(true, |to| expense.expense_date <= to)
            && self.category.map_or(true, |c| expense.category == c)
    }
}

#[async_trait]
pub trait ExpensePort: DomainPort + HealthCheckable {
    async fn create_expense(&self, expense: NewExpense) -> Result<Expense, PortError>;

    /// Expenses matching the query, newest first
    async fn list_expenses(&self, query: ExpenseQuery) -> Result<Vec<Expense>, PortError>;

    async fn delete_expense(&self, id: ExpenseId) -> Result<(), PortError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default)]
    pub struct MockExpensePort {
        expenses: Arc<RwLock<HashMap<ExpenseId, Expense>>>,
    }

    impl MockExpensePort {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockExpensePort {}

    #[async_trait]
    impl HealthCheckable for MockExpensePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-expense-port")
        }
    }

    #[async_trait]
    impl ExpensePort for MockExpensePort {
        async fn create_expense(&self, expense: NewExpense) -> Result<Expense, PortError> {
            let expense = Expense::record(ExpenseId::new_v7(), expense);
            self.expenses.write().await.insert(expense.id, expense.clone());
            Ok(expense)
        }

        async fn list_expenses(&self, query: ExpenseQuery) -> Result<Vec<Expense>, PortError> {
            let mut list: Vec<_> = self
                .expenses
                .read()
                .await
                .values()
                .filter(|e| query.matches(e))
                .cloned()
                .collect();
            list.sort_by(|a, b| b.expense_date.cmp(&a.expense_date).then(b.created_at.cmp(&a.created_at)));
            Ok(list)
        }

        async fn delete_expense(&self, id: ExpenseId) -> Result<(), PortError> {
            self.expenses
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Expense", id))
        }
    }
}
