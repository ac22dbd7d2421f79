//! Student handlers

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use core_kernel::StudentId;
use domain_admissions::StudentUpdate;

use crate::dto::students::*;
use crate::{error::ApiError, AppState};

/// Admits a student and generates their first fee schedule
///
/// The class must have a rate in the fee settings; it is checked before the
/// student is stored so an unpriced class never leaves a student without
/// fees.
pub async fn admit_student(
    State(state): State<AppState>,
    payload: Result<Json<AdmitStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AdmissionResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let today = state.today();
    let admission = request.into_admission(today);

    let settings = state.fee_schedules.load_settings().await?;
    settings.class_fee(&admission.class_enrolled)?;

    let student = state.admissions.admit(admission, today).await?;

    let fee_schedule = match state
        .fee_schedules
        .generate_for_admission(student.id, &student.class_enrolled, student.admission_date)
        .await
    {
        Ok(outcome) => Some(outcome),
        Err(error) => {
            warn!(student_id = %student.id, %error, "Fee schedule not generated at admission");
            None
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(AdmissionResponse {
            student: student.into(),
            fee_schedule,
        }),
    ))
}

/// Lists students
pub async fn list_students(
    State(state): State<AppState>,
    query: Result<Query<ListStudentsQuery>, QueryRejection>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let Query(query) = query?;
    let students = state.admissions.find(query.into()).await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

/// Gets a student by ID
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = state.admissions.get(StudentId::from_uuid(id)).await?;
    Ok(Json(student.into()))
}

/// Updates a student's class, guardian or transport details
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> Result<Json<StudentResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let update: StudentUpdate = request.into();
    if let Some(class) = &update.class_enrolled {
        state.fee_schedules.load_settings().await?.class_fee(class)?;
    }

    let student = state
        .admissions
        .update(StudentId::from_uuid(id), update)
        .await?;
    Ok(Json(student.into()))
}

/// Deactivates a student; their fee records are kept
pub async fn deactivate_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = state.admissions.deactivate(StudentId::from_uuid(id)).await?;
    Ok(Json(student.into()))
}
