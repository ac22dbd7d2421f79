//! Admission domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the admissions domain
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Student with the given ID was not found
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    /// Admission or update failed validation
    #[error("Admission validation failed: {0}")]
    ValidationFailed(String),

    /// The student has been deactivated
    #[error("Student {0} is inactive")]
    InactiveStudent(String),

    /// Storage failure
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl AdmissionError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        AdmissionError::StudentNotFound(id.to_string())
    }

    /// Creates a ValidationFailed error from validation errors
    pub fn validation_failed(errors: Vec<String>) -> Self {
        AdmissionError::ValidationFailed(errors.join("; "))
    }

    /// Maps a port error, turning NotFound into `StudentNotFound`
    pub fn from_port(error: PortError) -> Self {
        match error {
            PortError::NotFound { id, .. } => AdmissionError::StudentNotFound(id),
            PortError::Validation { message, .. } => AdmissionError::ValidationFailed(message),
            other => AdmissionError::Persistence(other.to_string()),
        }
    }
}
