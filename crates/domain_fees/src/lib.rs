//! Fees Domain - Monthly Fee Schedules
//!
//! This crate owns everything about what a student owes the school:
//!
//! - **Settings**: the per-class rate table (tuition and admission fee) and
//!   the transport fee bands, held in one [`FeeSettings`] value
//! - **Obligations**: one [`MonthlyFeeObligation`] per student per month,
//!   tracking what is due, what has been paid, and the resulting status
//! - **Schedule generation**: the [`FeeScheduleGenerator`] turns a class rate
//!   and an anchor date into the twelve obligations of one financial year
//!   (April to March)
//! - **Payments**: recording a payment against an obligation and issuing a
//!   receipt
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_fees::{FeeScheduleGenerator, AdmissionFeeAttribution};
//!
//! let generator = FeeScheduleGenerator::new(&settings);
//! let schedule = generator.generate(
//!     student_id,
//!     "Class 5",
//!     admission_date,
//!     AdmissionFeeAttribution::AdmissionMonth(admission_date),
//! )?;
//!
//! assert_eq!(schedule.obligations.len(), 12);
//! ```

pub mod settings;
pub mod obligation;
pub mod schedule;
pub mod payment;
pub mod statement;
pub mod ports;
pub mod services;
pub mod error;

pub use settings::{ClassFee, ClassFeeTable, TransportFeeBand, TransportFeeBands, FeeSettings};
pub use obligation::{MonthlyFeeObligation, NewFeeObligation, FeeStatus};
pub use schedule::{AdmissionFeeAttribution, AdmissionFeeRule, FeeSchedule, FeeScheduleGenerator};
pub use payment::{FeePayment, PaymentMethod, RecordPayment};
pub use statement::FeeStatement;
pub use ports::{Enrollment, EnrollmentPort, FeeObligationPort, FeeSettingsPort};
pub use services::{
    BackfillFailure, BackfillReport, FeePaymentService, FeeScheduleService,
    GenerationOutcome, GenerationRequest,
};
pub use error::FeeError;
