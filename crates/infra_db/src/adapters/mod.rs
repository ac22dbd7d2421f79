//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter:
//! - Implements its domain's port trait(s)
//! - Translates between domain models and the repository row types
//! - Converts `DatabaseError` into `PortError`
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresFeeAdapter;
//! use domain_fees::FeeObligationPort;
//! use std::sync::Arc;
//!
//! let adapter = Arc::new(PostgresFeeAdapter::new(pool));
//! let fees = adapter.list_for_student(student_id).await?;
//! ```

pub mod expenses;
pub mod fees;
pub mod settings;
pub mod students;

pub use expenses::PostgresExpenseAdapter;
pub use fees::PostgresFeeAdapter;
pub use settings::PostgresSettingsAdapter;
pub use students::PostgresStudentAdapter;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, Currency, HealthCheckResult};

use crate::error::DatabaseError;

/// Runs `SELECT 1` and reports the round trip
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}

/// Parses a stored currency code
pub(crate) fn parse_currency(code: &str) -> Result<Currency, DatabaseError> {
    code.parse::<Currency>()
        .map_err(|e| DatabaseError::invalid_data(e.to_string()))
}
