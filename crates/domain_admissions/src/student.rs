//! Student records

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{FinancialYear, StudentId};

use crate::error::AdmissionError;

/// Formats an admission number, e.g. `ADM-2024-0007`
pub fn admission_number(year: FinancialYear, sequence: u32) -> String {
    format!("ADM-{}-{:04}", year.start_year(), sequence)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = AdmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            other => Err(AdmissionError::ValidationFailed(format!("unknown gender '{}'", other))),
        }
    }
}

/// Details captured on the admission form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdmission {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    /// Class name as it appears in the fee settings
    pub class_enrolled: String,
    pub section: Option<String>,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    pub admission_date: NaiveDate,
    /// Distance from home to school, if the student uses school transport
    pub transport_distance_km: Option<Decimal>,
}

impl NewAdmission {
    /// The financial year the admission falls in
    pub fn financial_year(&self) -> FinancialYear {
        FinancialYear::containing(self.admission_date)
    }
}

/// Changes to an existing student; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUpdate {
    pub class_enrolled: Option<String>,
    pub section: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    pub transport_distance_km: Option<Decimal>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        self == &StudentUpdate::default()
    }
}

/// An admitted student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier
    pub id: StudentId,
    /// School-issued admission number
    pub admission_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub class_enrolled: String,
    pub section: Option<String>,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    pub admission_date: NaiveDate,
    pub transport_distance_km: Option<Decimal>,
    /// False once the student has left the school
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Creates the student record for an accepted admission
    pub fn admit(id: StudentId, admission_number: String, admission: NewAdmission) -> Self {
        let now = Utc::now();
        Self {
            id,
            admission_number,
            first_name: admission.first_name.trim().to_string(),
            last_name: admission.last_name.trim().to_string(),
            date_of_birth: admission.date_of_birth,
            gender: admission.gender,
            class_enrolled: admission.class_enrolled.trim().to_string(),
            section: admission.section,
            guardian_name: admission.guardian_name.trim().to_string(),
            guardian_phone: admission.guardian_phone.trim().to_string(),
            guardian_email: admission.guardian_email,
            address: admission.address,
            admission_date: admission.admission_date,
            transport_distance_km: admission.transport_distance_km,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years on the given date
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        let mut age = date.year() - self.date_of_birth.year();
        if (date.month(), date.day()) < (self.date_of_birth.month(), self.date_of_birth.day()) {
            age -= 1;
        }
        age.max(0) as u32
    }

    /// Applies an update in place
    pub fn apply(&mut self, update: StudentUpdate) {
        if let Some(class) = update.class_enrolled {
            self.class_enrolled = class.trim().to_string();
        }
        if let Some(section) = update.section {
            self.section = Some(section);
        }
        if let Some(name) = update.guardian_name {
            self.guardian_name = name.trim().to_string();
        }
        if let Some(phone) = update.guardian_phone {
            self.guardian_phone = phone.trim().to_string();
        }
        if let Some(email) = update.guardian_email {
            self.guardian_email = Some(email);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(distance) = update.transport_distance_km {
            self.transport_distance_km = Some(distance);
        }
        self.updated_at = Utc::now();
    }

    /// Marks the student as having left
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn admission() -> NewAdmission {
        NewAdmission {
            first_name: " Asha ".to_string(),
            last_name: "Verma".to_string(),
            date_of_birth: date(2016, 8, 20),
            gender: Gender::Female,
            class_enrolled: "Class 3 ".to_string(),
            section: Some("B".to_string()),
            guardian_name: "Rohit Verma".to_string(),
            guardian_phone: "9876543210".to_string(),
            guardian_email: None,
            address: None,
            admission_date: date(2024, 6, 3),
            transport_distance_km: None,
        }
    }

    #[test]
    fn test_admission_number_format() {
        let fy = FinancialYear::new(2024).unwrap();
        assert_eq!(admission_number(fy, 7), "ADM-2024-0007");
        assert_eq!(admission_number(fy, 12345), "ADM-2024-12345");
    }

    #[test]
    fn test_admit_trims_fields() {
        let student = Student::admit(StudentId::new(), "ADM-2024-0001".into(), admission());
        assert_eq!(student.first_name, "Asha");
        assert_eq!(student.class_enrolled, "Class 3");
        assert!(student.is_active);
        assert_eq!(student.full_name(), "Asha Verma");
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let student = Student::admit(StudentId::new(), "ADM-2024-0001".into(), admission());
        assert_eq!(student.age_on(date(2024, 8, 19)), 7);
        assert_eq!(student.age_on(date(2024, 8, 20)), 8);
    }

    #[test]
    fn test_apply_update_and_deactivate() {
        let mut student = Student::admit(StudentId::new(), "ADM-2024-0001".into(), admission());
        student.apply(StudentUpdate {
            class_enrolled: Some("Class 4".into()),
            ..Default::default()
        });
        assert_eq!(student.class_enrolled, "Class 4");
        assert_eq!(student.section.as_deref(), Some("B"));

        student.deactivate();
        assert!(!student.is_active);
    }

    #[test]
    fn test_admission_financial_year() {
        let mut new = admission();
        new.admission_date = date(2025, 1, 15);
        assert_eq!(new.financial_year().start_year(), 2024);
    }
}
