//! Repository implementations
//!
//! Repositories own the SQL. They speak in `*Row` types that mirror the
//! tables; the adapters in [`crate::adapters`] turn those into domain
//! values.
//!
//! Multi-statement writes (admission numbering, payments, settings
//! replacement) run in a single transaction.

pub mod expenses;
pub mod fees;
pub mod settings;
pub mod students;

pub use expenses::ExpenseRepository;
pub use fees::FeeRepository;
pub use settings::SettingsRepository;
pub use students::StudentRepository;
