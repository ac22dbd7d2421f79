//! School Fees - Fee Backfill
//!
//! Generates the fee schedule for every active student that has no fee
//! records, anchored at each student's admission date. Reads the same
//! `API_*` configuration as the server.
//!
//! ```bash
//! cargo run --bin backfill-fees
//! ```
//!
//! Exits with status 1 if any student failed; the others are still
//! processed.

use std::process::ExitCode;

use anyhow::Context;

use infra_db::{create_pool, run_migrations, DatabaseConfig};
use interface_api::{config::ApiConfig, telemetry::init_tracing, AppPorts, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = ApiConfig::from_env().context("invalid API_* configuration")?;
    init_tracing(&config);

    let pool = create_pool(DatabaseConfig::new(config.database_url.clone()).max_connections(2))
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool).await.context("failed to run migrations")?;

    let state = AppState::new(config, AppPorts::postgres(pool));
    let report = state.fee_schedules.backfill().await?;

    for failure in &report.failures {
        tracing::error!(student_id = %failure.student_id, reason = %failure.reason, "Student not backfilled");
    }
    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded(),
        generated = report.generated,
        "Backfill complete"
    );

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
