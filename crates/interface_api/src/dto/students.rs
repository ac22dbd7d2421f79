//! Student DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_admissions::{Gender, NewAdmission, Student, StudentQuery, StudentUpdate};
use domain_fees::GenerationOutcome;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdmitStudentRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[validate(length(min = 1, max = 50))]
    pub class_enrolled: String,
    #[validate(length(max = 10))]
    pub section: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub guardian_name: String,
    pub guardian_phone: String,
    #[validate(email)]
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    /// Defaults to today in the school's timezone
    pub admission_date: Option<NaiveDate>,
    pub transport_distance_km: Option<Decimal>,
}

impl AdmitStudentRequest {
    pub fn into_admission(self, today: NaiveDate) -> NewAdmission {
        NewAdmission {
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            class_enrolled: self.class_enrolled,
            section: self.section,
            guardian_name: self.guardian_name,
            guardian_phone: self.guardian_phone,
            guardian_email: self.guardian_email,
            address: self.address,
            admission_date: self.admission_date.unwrap_or(today),
            transport_distance_km: self.transport_distance_km,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = 50))]
    pub class_enrolled: Option<String>,
    #[validate(length(max = 10))]
    pub section: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    #[validate(email)]
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    pub transport_distance_km: Option<Decimal>,
}

impl From<UpdateStudentRequest> for StudentUpdate {
    fn from(request: UpdateStudentRequest) -> Self {
        StudentUpdate {
            class_enrolled: request.class_enrolled,
            section: request.section,
            guardian_name: request.guardian_name,
            guardian_phone: request.guardian_phone,
            guardian_email: request.guardian_email,
            address: request.address,
            transport_distance_km: request.transport_distance_km,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStudentsQuery {
    pub class: Option<String>,
    pub search: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<ListStudentsQuery> for StudentQuery {
    fn from(query: ListStudentsQuery) -> Self {
        StudentQuery {
            class_enrolled: query.class,
            search: query.search,
            is_active: query.active,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: Uuid,
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
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id.into(),
            admission_number: student.admission_number,
            first_name: student.first_name,
            last_name: student.last_name,
            date_of_birth: student.date_of_birth,
            gender: student.gender,
            class_enrolled: student.class_enrolled,
            section: student.section,
            guardian_name: student.guardian_name,
            guardian_phone: student.guardian_phone,
            guardian_email: student.guardian_email,
            address: student.address,
            admission_date: student.admission_date,
            transport_distance_km: student.transport_distance_km,
            is_active: student.is_active,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

/// Admission result: the stored student and the fee schedule created for it
///
/// `feeSchedule` is absent when generation failed after the student was
/// stored; the backfill job picks such students up.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub student: StudentResponse,
    pub fee_schedule: Option<GenerationOutcome>,
}
