//! Fee handlers

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{FeeObligationId, StudentId};
use domain_fees::{GenerationOutcome, RecordPayment};

use crate::dto::fees::*;
use crate::{error::ApiError, AppState};

/// Creates the monthly fees of one academic year for a student
///
/// Without `academicYear` the schedule is anchored on today in the school
/// timezone. An `academicYear` overrides that anchor with 1 April of the
/// given year, so past or future years can be generated explicitly.
/// Periods that already exist are skipped, so repeating the request is
/// harmless. Responds 201 when anything was created and 200 otherwise.
pub async fn generate_monthly_fees(
    State(state): State<AppState>,
    payload: Result<Json<GenerateFeesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerationOutcome>), ApiError> {
    let Json(request) = payload?;
    let academic_year = request
        .academic_year
        .as_ref()
        .map(AcademicYear::to_financial_year)
        .transpose()?;

    let outcome = state
        .fee_schedules
        .generate_manual(StudentId::from_uuid(request.student_id), academic_year, state.today())
        .await?;

    let status = if outcome.is_noop() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}

/// Gets one monthly fee record
pub async fn get_obligation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ObligationResponse>, ApiError> {
    let obligation = state
        .fee_payments
        .get_obligation(FeeObligationId::from_uuid(id))
        .await?;
    Ok(Json(obligation.into()))
}

/// Records a payment against a monthly fee record
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentReceiptResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let payment = RecordPayment {
        amount: to_money(request.amount, state.config.currency, "amount")?,
        method: request.method,
        paid_on: request.paid_on.unwrap_or_else(|| state.today()),
        remarks: request.remarks,
    };

    let (obligation, payment) = state
        .fee_payments
        .record_payment(FeeObligationId::from_uuid(id), payment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentReceiptResponse {
            payment: payment.into(),
            obligation: obligation.into(),
        }),
    ))
}

/// Lists the payments made against a monthly fee record
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state
        .fee_payments
        .list_payments(FeeObligationId::from_uuid(id))
        .await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

/// Fee statement for a student
pub async fn student_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    query: Result<Query<StatementQuery>, QueryRejection>,
) -> Result<Json<StatementResponse>, ApiError> {
    let Query(query) = query?;
    let student = state.admissions.get(StudentId::from_uuid(id)).await?;

    let statement = state
        .fee_payments
        .statement(
            student.id,
            state.config.currency,
            query.as_of.unwrap_or_else(|| state.today()),
        )
        .await?;
    Ok(Json(statement.into()))
}
