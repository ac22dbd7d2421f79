//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the school fees system using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern:
//! - [`repositories`] own the SQL and work with plain row structs
//! - [`adapters`] implement the domain ports on top of the repositories
//!
//! The schema lives in `migrations/` at the workspace root and is applied
//! with [`run_migrations`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresFeeAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/school_fees")).await?;
//! run_migrations(&pool).await?;
//! let fees = PostgresFeeAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{
    PostgresExpenseAdapter, PostgresFeeAdapter, PostgresSettingsAdapter, PostgresStudentAdapter,
};
