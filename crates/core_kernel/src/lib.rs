//! Core Kernel - Foundational types and utilities for the school fees system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Financial year and monthly fee period types (Indian April-March year)
//! - Common identifiers and value objects
//! - Port error and health-check plumbing shared by every adapter

pub mod money;
pub mod financial_year;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use financial_year::{FinancialYear, FeePeriod, Timezone, CalendarError};
pub use identifiers::{
    StudentId, FeeObligationId, FeePaymentId, ExpenseId,
    ClassFeeId, TransportBandId, SettingsId, IdParseError,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
