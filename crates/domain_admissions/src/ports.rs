//! Admissions Domain Ports
//!
//! The `StudentPort` trait is everything the admissions domain needs from
//! storage. `infra_db` provides the PostgreSQL adapter; the mock below keeps
//! students in memory for tests.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError, StudentId};

use crate::student::{NewAdmission, Student, StudentUpdate};

/// Query parameters for listing students
#[derive(Debug, Clone, Default)]
pub struct StudentQuery {
    /// Filter by class (case-insensitive)
    pub class_enrolled: Option<String>,
    /// Match against first name, last name or admission number
    pub search: Option<String>,
    /// Filter by active status
    pub is_active: Option<bool>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl StudentQuery {
    /// Active students of one class
    pub fn by_class(class_enrolled: impl Into<String>) -> Self {
        Self {
            class_enrolled: Some(class_enrolled.into()),
            is_active: Some(true),
            ..Default::default()
        }
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Storage for student records
#[async_trait]
pub trait StudentPort: DomainPort + HealthCheckable {
    /// Stores a new student, issuing the next admission number for the
    /// admission's financial year
    async fn create_student(&self, admission: NewAdmission) -> Result<Student, PortError>;

    async fn get_student(&self, id: StudentId) -> Result<Student, PortError>;

    /// Students matching the query, ordered by admission number
    async fn find_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError>;

    async fn update_student(&self, id: StudentId, update: StudentUpdate) -> Result<Student, PortError>;

    /// Marks a student inactive; records are never deleted
    async fn deactivate_student(&self, id: StudentId) -> Result<Student, PortError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{FinancialYear, HealthCheckResult};

    use crate::student::admission_number;

    /// In-memory mock implementation of StudentPort
    #[derive(Debug, Default)]
    pub struct MockStudentPort {
        students: Arc<RwLock<HashMap<StudentId, Student>>>,
        sequences: Arc<RwLock<HashMap<FinancialYear, u32>>>,
    }

    impl MockStudentPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with students for testing
        pub async fn with_students(students: Vec<Student>) -> Self {
            let port = Self::new();
            for student in students {
                port.students.write().await.insert(student.id, student);
            }
            port
        }
    }

    impl DomainPort for MockStudentPort {}

    #[async_trait]
    impl HealthCheckable for MockStudentPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-student-port")
        }
    }

    #[async_trait]
    impl StudentPort for MockStudentPort {
        async fn create_student(&self, admission: NewAdmission) -> Result<Student, PortError> {
            let sequence = {
                let mut sequences = self.sequences.write().await;
                let next = sequences.entry(admission.financial_year()).or_insert(0);
                *next += 1;
                *next
            };
            let number = admission_number(admission.financial_year(), sequence);
            let student = Student::admit(StudentId::new_v7(), number, admission);
            self.students.write().await.insert(student.id, student.clone());
            Ok(student)
        }

        async fn get_student(&self, id: StudentId) -> Result<Student, PortError> {
            self.students
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Student", id))
        }

        async fn find_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError> {
            let students = self.students.read().await;
            let search = query.search.as_ref().map(|s| s.to_lowercase());
            let mut results: Vec<_> = students
                .values()
                .filter(|s| {
                    if let Some(ref class) = query.class_enrolled {
                        if !s.class_enrolled.eq_ignore_ascii_case(class.trim()) {
                            return false;
                        }
                    }
                    if let Some(active) = query.is_active {
                        if s.is_active != active {
                            return false;
                        }
                    }
                    if let Some(ref needle) = search {
                        let hit = s.first_name.to_lowercase().contains(needle)
                            || s.last_name.to_lowercase().contains(needle)
                            || s.admission_number.to_lowercase().contains(needle);
                        if !hit {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();

            results.sort_by(|a, b| a.admission_number.cmp(&b.admission_number));

            let offset = query.offset.unwrap_or(0) as usize;
            let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
            Ok(results.into_iter().skip(offset).take(limit).collect())
        }

        async fn update_student(&self, id: StudentId, update: StudentUpdate) -> Result<Student, PortError> {
            let mut students = self.students.write().await;
            let student = students
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Student", id))?;
            student.apply(update);
            Ok(student.clone())
        }

        async fn deactivate_student(&self, id: StudentId) -> Result<Student, PortError> {
            let mut students = self.students.write().await;
            let student = students
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Student", id))?;
            student.deactivate();
            Ok(student.clone())
        }
    }
}
