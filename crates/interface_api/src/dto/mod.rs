//! Request and response bodies

pub mod students;
pub mod fees;
pub mod settings;
pub mod expenses;
