//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ExpenseId, FeeObligationId, FeePeriod, Money, StudentId};
use domain_admissions::{Gender, NewAdmission};
use domain_expenses::{ExpenseCategory, NewExpense};
use domain_fees::{MonthlyFeeObligation, NewFeeObligation};

use crate::fixtures::{DateFixtures, MoneyFixtures};

/// Builder for admission forms
#[derive(Debug, Clone)]
pub struct AdmissionBuilder {
    admission: NewAdmission,
}

impl Default for AdmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionBuilder {
    /// A valid "Class 5" admission on 10 June 2024
    pub fn new() -> Self {
        Self {
            admission: NewAdmission {
                first_name: "Aarav".to_string(),
                last_name: "Sharma".to_string(),
                date_of_birth: DateFixtures::birth_date(),
                gender: Gender::Male,
                class_enrolled: "Class 5".to_string(),
                section: Some("A".to_string()),
                guardian_name: "Rohit Sharma".to_string(),
                guardian_phone: "9876543210".to_string(),
                guardian_email: Some("rohit.sharma@example.com".to_string()),
                address: Some("12 MG Road, Pune".to_string()),
                admission_date: DateFixtures::june_admission(),
                transport_distance_km: None,
            },
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.admission.first_name = first.into();
        self.admission.last_name = last.into();
        self
    }

    pub fn with_class(mut self, class_enrolled: impl Into<String>) -> Self {
        self.admission.class_enrolled = class_enrolled.into();
        self
    }

    pub fn with_admission_date(mut self, date: NaiveDate) -> Self {
        self.admission.admission_date = date;
        self
    }

    pub fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
        self.admission.date_of_birth = date;
        self
    }

    pub fn with_guardian_phone(mut self, phone: impl Into<String>) -> Self {
        self.admission.guardian_phone = phone.into();
        self
    }

    pub fn with_transport_distance(mut self, km: Decimal) -> Self {
        self.admission.transport_distance_km = Some(km);
        self
    }

    pub fn build(self) -> NewAdmission {
        self.admission
    }
}

/// Builder for stored fee obligations
#[derive(Debug, Clone)]
pub struct ObligationBuilder {
    student_id: StudentId,
    period: FeePeriod,
    tuition_fee: Money,
    admission_fee: Money,
    paid: Option<(Money, NaiveDate)>,
}

impl Default for ObligationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ObligationBuilder {
    /// An unpaid April 2024 obligation of 5000 tuition
    pub fn new() -> Self {
        Self {
            student_id: StudentId::new_v7(),
            period: DateFixtures::fy_2024().first_period(),
            tuition_fee: MoneyFixtures::inr(dec!(5000)),
            admission_fee: MoneyFixtures::inr_zero(),
            paid: None,
        }
    }

    pub fn for_student(mut self, student_id: StudentId) -> Self {
        self.student_id = student_id;
        self
    }

    pub fn for_period(mut self, period: FeePeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_tuition(mut self, amount: Decimal) -> Self {
        self.tuition_fee = MoneyFixtures::inr(amount);
        self
    }

    pub fn with_admission_fee(mut self, amount: Decimal) -> Self {
        self.admission_fee = MoneyFixtures::inr(amount);
        self
    }

    /// Records a payment of `amount` made on `paid_on`
    pub fn paid(mut self, amount: Decimal, paid_on: NaiveDate) -> Self {
        self.paid = Some((MoneyFixtures::inr(amount), paid_on));
        self
    }

    /// Builds the obligation
    ///
    /// # Panics
    ///
    /// Panics if the configured payment is not accepted by the obligation.
    pub fn build(self) -> MonthlyFeeObligation {
        let mut obligation = NewFeeObligation {
            student_id: self.student_id,
            period: self.period,
            tuition_fee: self.tuition_fee,
            admission_fee: self.admission_fee,
        }
        .into_obligation(FeeObligationId::new_v7(), Utc::now());

        if let Some((amount, paid_on)) = self.paid {
            obligation
                .apply_payment(amount, paid_on)
                .expect("builder payment must fit the obligation");
        }
        obligation
    }
}

/// Builder for expenses
#[derive(Debug, Clone)]
pub struct ExpenseBuilder {
    expense: NewExpense,
}

impl Default for ExpenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseBuilder {
    pub fn new() -> Self {
        Self {
            expense: NewExpense {
                category: ExpenseCategory::Utilities,
                description: "Electricity bill".to_string(),
                amount: MoneyFixtures::inr(dec!(4200)),
                expense_date: DateFixtures::date(2024, 7, 5),
                paid_to: Some("State Electricity Board".to_string()),
            },
        }
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.expense.category = category;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.expense.amount = MoneyFixtures::inr(amount);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.expense.expense_date = date;
        self
    }

    pub fn build(self) -> NewExpense {
        self.expense
    }
}

/// A fresh expense id, for lookups that should miss
pub fn unknown_expense_id() -> ExpenseId {
    ExpenseId::new_v7()
}
