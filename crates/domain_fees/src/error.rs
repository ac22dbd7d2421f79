//! Fees domain errors

use core_kernel::{CalendarError, MoneyError, PortError};
use thiserror::Error;

/// Errors that can occur in the fees domain
#[derive(Debug, Error)]
pub enum FeeError {
    /// The school's fee settings record does not exist
    #[error("Fee settings not found")]
    SettingsNotFound,

    /// The class has no entry in the class rate table
    #[error("No fee configured for class '{0}'")]
    ClassFeeNotFound(String),

    /// The student does not exist
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    /// The fee obligation does not exist
    #[error("Fee obligation not found: {0}")]
    ObligationNotFound(String),

    /// A payment was rejected
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    /// Settings failed validation
    #[error("Invalid fee settings: {0}")]
    InvalidSettings(String),

    /// The obligation changed underneath a payment
    #[error("Concurrent update: {0}")]
    Conflict(String),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Calendar value was invalid
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// The persistence layer failed
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl FeeError {
    /// Wraps a port failure that has no more specific meaning
    pub fn persistence(error: PortError) -> Self {
        match error {
            PortError::Conflict { message } => FeeError::Conflict(message),
            other => FeeError::Persistence(other.to_string()),
        }
    }
}
