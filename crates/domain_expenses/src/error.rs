//! Expense domain errors

use core_kernel::{MoneyError, PortError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("Expense not found: {0}")]
    NotFound(String),

    #[error("Invalid expense: {0}")]
    Invalid(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl ExpenseError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ExpenseError::Invalid(message.into())
    }

    /// Maps a port error, turning NotFound into `ExpenseError::NotFound`
    pub fn from_port(error: PortError) -> Self {
        match error {
            PortError::NotFound { id, .. } => ExpenseError::NotFound(id),
            PortError::Validation { message, .. } => ExpenseError::Invalid(message),
            other => ExpenseError::Persistence(other.to_string()),
        }
    }
}
