//! PostgreSQL Expense Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{DomainPort, ExpenseId, HealthCheckResult, HealthCheckable, Money, PortError};
use domain_expenses::{Expense, ExpenseCategory, ExpensePort, ExpenseQuery, NewExpense};

use super::parse_currency;
use crate::error::DatabaseError;
use crate::repositories::expenses::{ExpenseFilter, ExpenseRepository, ExpenseRow};

#[derive(Debug, Clone)]
pub struct PostgresExpenseAdapter {
    repository: ExpenseRepository,
    pool: PgPool,
}

impl PostgresExpenseAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ExpenseRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresExpenseAdapter {}

#[async_trait]
impl HealthCheckable for PostgresExpenseAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-expense-adapter").await
    }
}

#[async_trait]
impl ExpensePort for PostgresExpenseAdapter {
    #[instrument(skip(self, expense), fields(category = %expense.category))]
    async fn create_expense(&self, expense: NewExpense) -> Result<Expense, PortError> {
        let recorded = Expense::record(ExpenseId::new_v7(), expense);
        let row = self.repository.insert(&expense_to_row(&recorded)).await?;
        info!(amount = %recorded.amount, "Expense recorded");
        Ok(row_to_expense(row)?)
    }

    #[instrument(skip(self))]
    async fn list_expenses(&self, query: ExpenseQuery) -> Result<Vec<Expense>, PortError> {
        let filter = ExpenseFilter {
            from: query.from,
            to: query.to,
            category: query.category.map(|c| c.as_str().to_string()),
        };
        let rows = self.repository.list(&filter).await?;
        debug!(count = rows.len(), "Expenses listed");
        rows.into_iter()
            .map(|row| row_to_expense(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self), fields(expense_id = %id))]
    async fn delete_expense(&self, id: ExpenseId) -> Result<(), PortError> {
        self.repository.delete(id.into()).await?;
        info!("Expense deleted");
        Ok(())
    }
}

fn expense_to_row(expense: &Expense) -> ExpenseRow {
    ExpenseRow {
        expense_id: expense.id.into(),
        category: expense.category.as_str().to_string(),
        description: expense.description.clone(),
        amount: expense.amount.amount(),
        currency: expense.amount.currency().code().to_string(),
        expense_date: expense.expense_date,
        paid_to: expense.paid_to.clone(),
        created_at: expense.created_at,
    }
}

fn row_to_expense(row: ExpenseRow) -> Result<Expense, DatabaseError> {
    let currency = parse_currency(&row.currency)?;
    let category = row
        .category
        .parse::<ExpenseCategory>()
        .map_err(|e| DatabaseError::invalid_data(e.to_string()))?;

    Ok(Expense {
        id: ExpenseId::from_uuid(row.expense_id),
        category,
        description: row.description,
        amount: Money::new(row.amount, currency),
        expense_date: row.expense_date,
        paid_to: row.paid_to,
        created_at: row.created_at,
    })
}
