//! Admission application service

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use core_kernel::StudentId;

use crate::error::AdmissionError;
use crate::ports::{StudentPort, StudentQuery};
use crate::student::{NewAdmission, Student, StudentUpdate};
use crate::validation::AdmissionValidator;

/// Validates and stores admissions and student changes
pub struct AdmissionService {
    students: Arc<dyn StudentPort>,
}

impl AdmissionService {
    pub fn new(students: Arc<dyn StudentPort>) -> Self {
        Self { students }
    }

    /// Validates the admission as of `today` and stores the student
    #[instrument(skip(self, admission), fields(class = %admission.class_enrolled))]
    pub async fn admit(&self, admission: NewAdmission, today: NaiveDate) -> Result<Student, AdmissionError> {
        let warnings = AdmissionValidator::validate(&admission, today).into_result()?;
        for warning in &warnings {
            warn!(%warning, "Admission accepted with warning");
        }

        let student = self
            .students
            .create_student(admission)
            .await
            .map_err(AdmissionError::from_port)?;

        info!(
            student_id = %student.id,
            admission_number = %student.admission_number,
            "Student admitted"
        );
        Ok(student)
    }

    pub async fn get(&self, id: StudentId) -> Result<Student, AdmissionError> {
        self.students.get_student(id).await.map_err(AdmissionError::from_port)
    }

    pub async fn find(&self, query: StudentQuery) -> Result<Vec<Student>, AdmissionError> {
        self.students.find_students(query).await.map_err(AdmissionError::from_port)
    }

    /// Applies a validated update; inactive students cannot be changed
    pub async fn update(&self, id: StudentId, update: StudentUpdate) -> Result<Student, AdmissionError> {
        AdmissionValidator::validate_update(&update).into_result()?;

        let current = self.get(id).await?;
        if !current.is_active {
            return Err(AdmissionError::InactiveStudent(id.to_string()));
        }
        if update.is_empty() {
            return Ok(current);
        }

        self.students
            .update_student(id, update)
            .await
            .map_err(AdmissionError::from_port)
    }

    pub async fn deactivate(&self, id: StudentId) -> Result<Student, AdmissionError> {
        let student = self
            .students
            .deactivate_student(id)
            .await
            .map_err(AdmissionError::from_port)?;
        info!(student_id = %id, "Student deactivated");
        Ok(student)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::ports::mock::MockStudentPort;
    use crate::student::Gender;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn admission(first_name: &str, class: &str, admitted: NaiveDate) -> NewAdmission {
        NewAdmission {
            first_name: first_name.to_string(),
            last_name: "Sharma".to_string(),
            date_of_birth: date(2015, 5, 5),
            gender: Gender::Other,
            class_enrolled: class.to_string(),
            section: None,
            guardian_name: "Anil Sharma".to_string(),
            guardian_phone: "9123456780".to_string(),
            guardian_email: None,
            address: Some("12 MG Road".to_string()),
            admission_date: admitted,
            transport_distance_km: Some(dec!(4)),
        }
    }

    fn service() -> AdmissionService {
        AdmissionService::new(Arc::new(MockStudentPort::new()))
    }

    #[tokio::test]
    async fn admission_numbers_restart_each_financial_year() {
        let service = service();
        let today = date(2025, 6, 1);

        let a = service.admit(admission("Ira", "Class 4", date(2024, 4, 10)), today).await.unwrap();
        let b = service.admit(admission("Dev", "Class 4", date(2025, 2, 10)), today).await.unwrap();
        let c = service.admit(admission("Zoya", "Class 2", date(2025, 4, 10)), today).await.unwrap();

        assert_eq!(a.admission_number, "ADM-2024-0001");
        assert_eq!(b.admission_number, "ADM-2024-0002");
        assert_eq!(c.admission_number, "ADM-2025-0001");
    }

    #[tokio::test]
    async fn invalid_admission_is_not_stored() {
        let service = service();
        let mut bad = admission("", "Class 4", date(2024, 4, 10));
        bad.guardian_phone = "call me".to_string();

        let result = service.admit(bad, date(2024, 5, 1)).await;
        assert!(matches!(result, Err(AdmissionError::ValidationFailed(_))));
        assert!(service.find(StudentQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_filters_by_class_and_search() {
        let service = service();
        let today = date(2024, 12, 1);
        service.admit(admission("Ira", "Class 4", date(2024, 4, 10)), today).await.unwrap();
        service.admit(admission("Dev", "class 4", date(2024, 5, 10)), today).await.unwrap();
        service.admit(admission("Zoya", "Class 2", date(2024, 6, 10)), today).await.unwrap();

        let class_four = service.find(StudentQuery::by_class("CLASS 4")).await.unwrap();
        assert_eq!(class_four.len(), 2);

        let search = StudentQuery {
            search: Some("zoy".to_string()),
            ..Default::default()
        };
        let found = service.find(search).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Zoya");

        let page = service
            .find(StudentQuery::default().paginate(1, 1))
            .await
            .unwrap();
        assert_eq!(page[0].admission_number, "ADM-2024-0002");
    }

    #[tokio::test]
    async fn inactive_students_cannot_be_updated() {
        let service = service();
        let student = service
            .admit(admission("Ira", "Class 4", date(2024, 4, 10)), date(2024, 4, 10))
            .await
            .unwrap();

        let updated = service
            .update(
                student.id,
                StudentUpdate {
                    section: Some("A".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.section.as_deref(), Some("A"));

        service.deactivate(student.id).await.unwrap();
        let result = service
            .update(
                student.id,
                StudentUpdate {
                    section: Some("C".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AdmissionError::InactiveStudent(_))));
    }

    #[tokio::test]
    async fn unknown_student() {
        let result = service().get(StudentId::new()).await;
        assert!(matches!(result, Err(AdmissionError::StudentNotFound(_))));
    }
}
