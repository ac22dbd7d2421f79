//! Test Utilities Crate
//!
//! Shared test infrastructure for the school fees workspace.
//!
//! # Modules
//!
//! - `fixtures`: Fixed settings, dates and money values
//! - `builders`: Builders for admissions, obligations and expenses
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers for fee schedules
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
