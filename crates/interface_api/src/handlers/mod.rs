//! Request handlers

pub mod health;
pub mod login;
pub mod students;
pub mod fees;
pub mod settings;
pub mod expenses;
