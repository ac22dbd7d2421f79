//! Expenses Domain
//!
//! Money the school spends: salaries, utilities, maintenance and the rest.
//! Expenses are recorded one by one and summarized per month and category.

pub mod expense;
pub mod summary;
pub mod ports;
pub mod services;
pub mod error;

pub use expense::{Expense, ExpenseCategory, NewExpense};
pub use summary::{ExpenseSummary, MonthlyExpenseTotal};
pub use ports::{ExpensePort, ExpenseQuery};
pub use services::ExpenseService;
pub use error::ExpenseError;
