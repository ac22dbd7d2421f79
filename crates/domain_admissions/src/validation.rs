//! Admission validation rules
//!
//! # Rules
//!
//! ## New admissions
//! - First and last name are required
//! - Class and guardian name are required
//! - Date of birth must be before the admission date
//! - Admission date cannot be in the future
//! - Guardian phone is 10-15 digits, optionally with a leading `+`
//! - Guardian email, when given, must look like an address
//! - Transport distance, when given, must not be negative
//!
//! ## Updates
//! - Any field that is provided follows the same rule as on admission
//!
//! Students older than 20 on admission produce a warning, not an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::AdmissionError;
use crate::student::{NewAdmission, StudentUpdate};

const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;
const WARN_AGE_YEARS: i32 = 20;

/// Result of admission validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the admission is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// Non-fatal issues
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Converts into `Err(ValidationFailed)` when any error was recorded
    pub fn into_result(self) -> Result<Vec<String>, AdmissionError> {
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(AdmissionError::validation_failed(self.errors))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Validator for admissions and student updates
pub struct AdmissionValidator;

impl AdmissionValidator {
    /// Validates a new admission as of `today`
    pub fn validate(admission: &NewAdmission, today: NaiveDate) -> ValidationResult {
        let mut result = ValidationResult::ok();

        Self::require(&mut result, &admission.first_name, "First name");
        Self::require(&mut result, &admission.last_name, "Last name");
        Self::require(&mut result, &admission.class_enrolled, "Class");
        Self::require(&mut result, &admission.guardian_name, "Guardian name");

        if admission.admission_date > today {
            result.add_error("Admission date cannot be in the future");
        }
        if admission.date_of_birth >= admission.admission_date {
            result.add_error("Date of birth must be before the admission date");
        } else {
            let years = admission.admission_date.years_since(admission.date_of_birth).unwrap_or(0);
            if years as i32 > WARN_AGE_YEARS {
                result.add_warning(format!("Student is {} years old on admission", years));
            }
        }

        Self::check_phone(&mut result, &admission.guardian_phone);
        if let Some(ref email) = admission.guardian_email {
            Self::check_email(&mut result, email);
        }
        if let Some(distance) = admission.transport_distance_km {
            Self::check_distance(&mut result, distance);
        }

        result
    }

    /// Validates the provided fields of an update
    pub fn validate_update(update: &StudentUpdate) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if let Some(ref class) = update.class_enrolled {
            Self::require(&mut result, class, "Class");
        }
        if let Some(ref name) = update.guardian_name {
            Self::require(&mut result, name, "Guardian name");
        }
        if let Some(ref phone) = update.guardian_phone {
            Self::check_phone(&mut result, phone);
        }
        if let Some(ref email) = update.guardian_email {
            Self::check_email(&mut result, email);
        }
        if let Some(distance) = update.transport_distance_km {
            Self::check_distance(&mut result, distance);
        }

        result
    }

    fn require(result: &mut ValidationResult, value: &str, label: &str) {
        if value.trim().is_empty() {
            result.add_error(format!("{} is required", label));
        }
    }

    fn check_phone(result: &mut ValidationResult, phone: &str) {
        let phone = phone.trim();
        let digits = phone.strip_prefix('+').unwrap_or(phone);
        let valid = digits.chars().all(|c| c.is_ascii_digit())
            && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len());
        if !valid {
            result.add_error(format!("Invalid guardian phone number: {}", phone));
        }
    }

    fn check_email(result: &mut ValidationResult, email: &str) {
        let valid = match email.trim().split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
            None => false,
        };
        if !valid {
            result.add_error(format!("Invalid email format: {}", email));
        }
    }

    fn check_distance(result: &mut ValidationResult, distance: Decimal) {
        if distance < Decimal::ZERO {
            result.add_error("Transport distance cannot be negative");
        }
    }
}
