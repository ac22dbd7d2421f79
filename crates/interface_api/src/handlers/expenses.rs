//! Expense handlers

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::ExpenseId;
use domain_expenses::ExpenseSummary;

use crate::dto::expenses::*;
use crate::{error::ApiError, AppState};

/// Records an expense
pub async fn create_expense(
    State(state): State<AppState>,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let expense = state
        .expenses
        .record(request.into_expense(state.config.currency)?)
        .await?;
    Ok((StatusCode::CREATED, Json(expense.into())))
}

/// Lists expenses, newest first
pub async fn list_expenses(
    State(state): State<AppState>,
    query: Result<Query<ExpenseFilterQuery>, QueryRejection>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let Query(query) = query?;
    let expenses = state.expenses.list(query.into_query()?).await?;
    Ok(Json(expenses.into_iter().map(Into::into).collect()))
}

/// Totals per month and category over the filtered expenses
pub async fn expense_summary(
    State(state): State<AppState>,
    query: Result<Query<ExpenseFilterQuery>, QueryRejection>,
) -> Result<Json<ExpenseSummary>, ApiError> {
    let Query(query) = query?;
    let summary = state.expenses.summary(query.into_query()?).await?;
    Ok(Json(summary))
}

/// Deletes an expense
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.expenses.delete(ExpenseId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
