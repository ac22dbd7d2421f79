//! Student repository implementation
//!
//! Student rows plus the per-financial-year admission number sequence.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const STUDENT_COLUMNS: &str = "student_id, admission_number, first_name, last_name, \
    date_of_birth, gender, class_enrolled, section, guardian_name, guardian_phone, \
    guardian_email, address, admission_date, transport_distance_km, is_active, \
    created_at, updated_at";

/// A row of the `students` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StudentRow {
    pub student_id: Uuid,
    pub admission_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
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

/// Filter for listing students
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub class_enrolled: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

/// Repository for student records
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a student, issuing the next admission sequence number for
    /// `financial_year` in the same transaction
    ///
    /// `number_for` turns the sequence number into the admission number
    /// stored on the row.
    pub async fn create(
        &self,
        financial_year: i32,
        mut row: StudentRow,
        number_for: impl FnOnce(u32) -> String,
    ) -> Result<StudentRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sequence: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO admission_sequences (financial_year, last_value)
            VALUES ($1, 1)
            ON CONFLICT (financial_year)
            DO UPDATE SET last_value = admission_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(financial_year)
        .fetch_one(&mut *tx)
        .await?;

        row.admission_number = number_for(sequence.max(1) as u32);

        let stored = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            INSERT INTO students (
                student_id, admission_number, first_name, last_name, date_of_birth,
                gender, class_enrolled, section, guardian_name, guardian_phone,
                guardian_email, address, admission_date, transport_distance_km,
                is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(row.student_id)
        .bind(&row.admission_number)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(row.date_of_birth)
        .bind(&row.gender)
        .bind(&row.class_enrolled)
        .bind(&row.section)
        .bind(&row.guardian_name)
        .bind(&row.guardian_phone)
        .bind(&row.guardian_email)
        .bind(&row.address)
        .bind(row.admission_date)
        .bind(row.transport_distance_km)
        .bind(row.is_active)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    pub async fn get(&self, student_id: Uuid) -> Result<StudentRow, DatabaseError> {
        sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students WHERE student_id = $1",
            STUDENT_COLUMNS
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Student", student_id))
    }

    /// Lists students matching the filter, ordered by admission number
    pub async fn find(&self, filter: &StudentFilter) -> Result<Vec<StudentRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM students WHERE TRUE", STUDENT_COLUMNS));

        if let Some(ref class) = filter.class_enrolled {
            builder
                .push(" AND LOWER(class_enrolled) = LOWER(")
                .push_bind(class.trim().to_string())
                .push(")");
        }
        if let Some(active) = filter.is_active {
            builder.push(" AND is_active = ").push_bind(active);
        }
        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search.trim());
            builder
                .push(" AND (first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR admission_number ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder
            .push(" ORDER BY admission_number LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        Ok(builder
            .build_query_as::<StudentRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// Writes the mutable fields of a student
    pub async fn update(&self, row: &StudentRow) -> Result<StudentRow, DatabaseError> {
        sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            UPDATE students SET
                class_enrolled = $2,
                section = $3,
                guardian_name = $4,
                guardian_phone = $5,
                guardian_email = $6,
                address = $7,
                transport_distance_km = $8,
                is_active = $9,
                updated_at = $10
            WHERE student_id = $1
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        ))
        .bind(row.student_id)
        .bind(&row.class_enrolled)
        .bind(&row.section)
        .bind(&row.guardian_name)
        .bind(&row.guardian_phone)
        .bind(&row.guardian_email)
        .bind(&row.address)
        .bind(row.transport_distance_km)
        .bind(row.is_active)
        .bind(row.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Student", row.student_id))
    }

    pub async fn deactivate(&self, student_id: Uuid) -> Result<StudentRow, DatabaseError> {
        sqlx::query_as::<_, StudentRow>(&format!(
            "UPDATE students SET is_active = FALSE, updated_at = NOW() \
             WHERE student_id = $1 RETURNING {}",
            STUDENT_COLUMNS
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Student", student_id))
    }
}
