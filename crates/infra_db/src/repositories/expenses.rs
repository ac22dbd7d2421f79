//! Expense repository implementation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const EXPENSE_COLUMNS: &str =
    "expense_id, category, description, amount, currency, expense_date, paid_to, created_at";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ExpenseRow {
    pub expense_id: Uuid,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub paid_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Date range and category filter; all bounds inclusive
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &ExpenseRow) -> Result<ExpenseRow, DatabaseError> {
        Ok(sqlx::query_as::<_, ExpenseRow>(&format!(
            "INSERT INTO expenses ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
            cols = EXPENSE_COLUMNS
        ))
        .bind(row.expense_id)
        .bind(&row.category)
        .bind(&row.description)
        .bind(row.amount)
        .bind(&row.currency)
        .bind(row.expense_date)
        .bind(&row.paid_to)
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Expenses matching the filter, newest first
    pub async fn list(&self, filter: &ExpenseFilter) -> Result<Vec<ExpenseRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM expenses WHERE TRUE", EXPENSE_COLUMNS));

        if let Some(from) = filter.from {
            builder.push(" AND expense_date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            builder.push(" AND expense_date <= ").push_bind(to);
        }
        if let Some(ref category) = filter.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        builder.push(" ORDER BY expense_date DESC, created_at DESC");

        Ok(builder
            .build_query_as::<ExpenseRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn delete(&self, expense_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM expenses WHERE expense_id = $1")
            .bind(expense_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Expense", expense_id));
        }
        Ok(())
    }
}
