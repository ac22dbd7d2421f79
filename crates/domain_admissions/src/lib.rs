//! Admissions Domain
//!
//! Student records from admission onwards:
//!
//! - **Students**: the admitted [`Student`] with class, guardian and
//!   transport details
//! - **Validation**: rules a [`NewAdmission`] or [`StudentUpdate`] must pass
//!   before it reaches storage
//! - **Admission numbers**: `ADM-<financial year start>-<sequence>`, issued
//!   by the [`StudentPort`] implementation
//!
//! Fee schedules for a new student are created by `domain_fees`; this crate
//! only knows the class and admission date they are derived from.

pub mod student;
pub mod validation;
pub mod ports;
pub mod services;
pub mod error;

pub use student::{admission_number, Gender, NewAdmission, Student, StudentUpdate};
pub use validation::{AdmissionValidator, ValidationResult};
pub use ports::{StudentPort, StudentQuery};
pub use services::AdmissionService;
pub use error::AdmissionError;
