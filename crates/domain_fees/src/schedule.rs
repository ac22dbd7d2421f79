//! Fee schedule generation
//!
//! Given a class rate and an anchor date, the generator produces the twelve
//! monthly obligations of the financial year containing that date:
//! April to December of the start year, then January to March of the next.
//!
//! ```text
//!   anchor 2024-06-15  ──►  FY 2024-25
//!
//!   2024-04  2024-05  ...  2024-12  2025-01  2025-02  2025-03
//!   T + A    T             T        T        T        T
//! ```
//!
//! `T` is the monthly tuition and `A` the one-time admission fee, which lands
//! on exactly one period chosen by [`AdmissionFeeAttribution`].
//!
//! The generator is pure: it never touches storage and never looks settings
//! up on its own. Callers pass the [`FeeSettings`] snapshot in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{FeePeriod, FinancialYear, Money, StudentId};

use crate::error::FeeError;
use crate::obligation::NewFeeObligation;
use crate::settings::FeeSettings;

/// Which period of the year carries the admission fee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionFeeAttribution {
    /// Always the April period of the financial year
    FinancialYearStart,
    /// The month the student was admitted in, when that date falls inside
    /// the generated year; otherwise April
    AdmissionMonth(NaiveDate),
}

impl AdmissionFeeAttribution {
    /// The period that carries the admission fee within `year`
    pub fn period_in(&self, year: FinancialYear) -> FeePeriod {
        match self {
            AdmissionFeeAttribution::FinancialYearStart => year.first_period(),
            AdmissionFeeAttribution::AdmissionMonth(date) if year.contains(*date) => {
                FeePeriod::containing(*date)
            }
            AdmissionFeeAttribution::AdmissionMonth(_) => year.first_period(),
        }
    }
}

/// Configured admission fee rule, resolved to an attribution per student
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionFeeRule {
    /// Charge the admission fee in the month of admission
    #[default]
    AdmissionMonth,
    /// Charge the admission fee in April of the financial year
    FinancialYearStart,
}

impl AdmissionFeeRule {
    /// Resolves the rule for a student admitted on `admission_date`
    pub fn attribution(&self, admission_date: NaiveDate) -> AdmissionFeeAttribution {
        match self {
            AdmissionFeeRule::AdmissionMonth => AdmissionFeeAttribution::AdmissionMonth(admission_date),
            AdmissionFeeRule::FinancialYearStart => AdmissionFeeAttribution::FinancialYearStart,
        }
    }
}

impl fmt::Display for AdmissionFeeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionFeeRule::AdmissionMonth => f.write_str("admission_month"),
            AdmissionFeeRule::FinancialYearStart => f.write_str("financial_year_start"),
        }
    }
}

impl FromStr for AdmissionFeeRule {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admission_month" => Ok(AdmissionFeeRule::AdmissionMonth),
            "financial_year_start" => Ok(AdmissionFeeRule::FinancialYearStart),
            other => Err(FeeError::InvalidSettings(format!(
                "unknown admission fee rule '{}'",
                other
            ))),
        }
    }
}

/// The twelve obligations computed for one student and financial year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    pub student_id: StudentId,
    pub financial_year: FinancialYear,
    /// Obligations in due-date order
    pub obligations: Vec<NewFeeObligation>,
}

impl FeeSchedule {
    /// Sum of all totals in the schedule
    pub fn total_amount(&self) -> Result<Money, FeeError> {
        let currency = self
            .obligations
            .first()
            .map(|o| o.tuition_fee.currency())
            .unwrap_or_default();
        let totals: Vec<Money> = self.obligations.iter().map(|o| o.total_amount()).collect();
        Ok(Money::sum(&totals, currency)?)
    }

    /// The periods covered, in order
    pub fn periods(&self) -> Vec<FeePeriod> {
        self.obligations.iter().map(|o| o.period).collect()
    }

    /// The obligation carrying the admission fee, if the fee is non-zero
    pub fn admission_obligation(&self) -> Option<&NewFeeObligation> {
        self.obligations.iter().find(|o| !o.admission_fee.is_zero())
    }
}

/// Computes fee schedules from a settings snapshot
#[derive(Debug, Clone, Copy)]
pub struct FeeScheduleGenerator<'a> {
    settings: &'a FeeSettings,
}

impl<'a> FeeScheduleGenerator<'a> {
    pub fn new(settings: &'a FeeSettings) -> Self {
        Self { settings }
    }

    /// Generates the schedule for the financial year containing `anchor`
    ///
    /// Fails with [`FeeError::ClassFeeNotFound`] when the class has no rate,
    /// in which case nothing is produced.
    pub fn generate(
        &self,
        student_id: StudentId,
        class_enrolled: &str,
        anchor: NaiveDate,
        attribution: AdmissionFeeAttribution,
    ) -> Result<FeeSchedule, FeeError> {
        let class_fee = self.settings.class_fee(class_enrolled)?;
        let financial_year = FinancialYear::containing(anchor);
        let admission_period = attribution.period_in(financial_year);
        let no_admission = Money::zero(class_fee.admission_fee.currency());

        let obligations = financial_year
            .periods()
            .into_iter()
            .map(|period| NewFeeObligation {
                student_id,
                period,
                tuition_fee: class_fee.tuition_fee,
                admission_fee: if period == admission_period {
                    class_fee.admission_fee
                } else {
                    no_admission
                },
            })
            .collect();

        Ok(FeeSchedule {
            student_id,
            financial_year,
            obligations,
        })
    }
}
