//! PostgreSQL Student Adapter
//!
//! Implements `StudentPort` over the [`StudentRepository`]. Admission numbers
//! are issued inside the insert transaction, so two concurrent admissions in
//! the same financial year never share a number.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, StudentId};
use domain_admissions::{
    admission_number, Gender, NewAdmission, Student, StudentPort, StudentQuery, StudentUpdate,
};

use crate::error::DatabaseError;
use crate::repositories::students::{StudentFilter, StudentRepository, StudentRow};

const DEFAULT_PAGE_SIZE: i64 = 100;

/// PostgreSQL-backed implementation of `StudentPort`
#[derive(Debug, Clone)]
pub struct PostgresStudentAdapter {
    repository: StudentRepository,
    pool: PgPool,
}

impl PostgresStudentAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: StudentRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresStudentAdapter {}

#[async_trait]
impl HealthCheckable for PostgresStudentAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-student-adapter").await
    }
}

#[async_trait]
impl StudentPort for PostgresStudentAdapter {
    #[instrument(skip(self, admission), fields(class = %admission.class_enrolled))]
    async fn create_student(&self, admission: NewAdmission) -> Result<Student, PortError> {
        let financial_year = admission.financial_year();
        // Placeholder number; the repository replaces it with the issued one
        let draft = Student::admit(StudentId::new_v7(), String::new(), admission);

        let row = self
            .repository
            .create(financial_year.start_year(), student_to_row(&draft), |seq| {
                admission_number(financial_year, seq)
            })
            .await?;

        info!(admission_number = %row.admission_number, "Student admitted");
        Ok(row_to_student(row)?)
    }

    #[instrument(skip(self), fields(student_id = %id))]
    async fn get_student(&self, id: StudentId) -> Result<Student, PortError> {
        debug!("Fetching student");
        let row = self.repository.get(id.into()).await?;
        Ok(row_to_student(row)?)
    }

    #[instrument(skip(self))]
    async fn find_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError> {
        let filter = StudentFilter {
            class_enrolled: query.class_enrolled,
            search: query.search.filter(|s| !s.trim().is_empty()),
            is_active: query.is_active,
            limit: query.limit.map_or(DEFAULT_PAGE_SIZE, i64::from),
            offset: query.offset.map_or(0, i64::from),
        };

        let rows = self.repository.find(&filter).await?;
        debug!(count = rows.len(), "Students found");
        rows.into_iter()
            .map(|row| row_to_student(row).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, update), fields(student_id = %id))]
    async fn update_student(&self, id: StudentId, update: StudentUpdate) -> Result<Student, PortError> {
        let mut student = row_to_student(self.repository.get(id.into()).await?)?;
        student.apply(update);
        let row = self.repository.update(&student_to_row(&student)).await?;
        Ok(row_to_student(row)?)
    }

    #[instrument(skip(self), fields(student_id = %id))]
    async fn deactivate_student(&self, id: StudentId) -> Result<Student, PortError> {
        let row = self.repository.deactivate(id.into()).await?;
        info!("Student deactivated");
        Ok(row_to_student(row)?)
    }
}

fn student_to_row(student: &Student) -> StudentRow {
    StudentRow {
        student_id: student.id.into(),
        admission_number: student.admission_number.clone(),
        first_name: student.first_name.clone(),
        last_name: student.last_name.clone(),
        date_of_birth: student.date_of_birth,
        gender: student.gender.as_str().to_string(),
        class_enrolled: student.class_enrolled.clone(),
        section: student.section.clone(),
        guardian_name: student.guardian_name.clone(),
        guardian_phone: student.guardian_phone.clone(),
        guardian_email: student.guardian_email.clone(),
        address: student.address.clone(),
        admission_date: student.admission_date,
        transport_distance_km: student.transport_distance_km,
        is_active: student.is_active,
        created_at: student.created_at,
        updated_at: student.updated_at,
    }
}

fn row_to_student(row: StudentRow) -> Result<Student, DatabaseError> {
    let gender = row
        .gender
        .parse::<Gender>()
        .map_err(|e| DatabaseError::invalid_data(e.to_string()))?;

    Ok(Student {
        id: StudentId::from_uuid(row.student_id),
        admission_number: row.admission_number,
        first_name: row.first_name,
        last_name: row.last_name,
        date_of_birth: row.date_of_birth,
        gender,
        class_enrolled: row.class_enrolled,
        section: row.section,
        guardian_name: row.guardian_name,
        guardian_phone: row.guardian_phone,
        guardian_email: row.guardian_email,
        address: row.address,
        admission_date: row.admission_date,
        transport_distance_km: row.transport_distance_km,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
