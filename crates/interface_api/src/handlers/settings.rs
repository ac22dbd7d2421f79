//! Fee settings handlers

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    Json,
};
use tracing::info;

use crate::dto::settings::*;
use crate::{error::ApiError, AppState};

/// Returns the class rate table and transport bands
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state.fee_schedules.load_settings().await?;
    Ok(Json(settings.into()))
}

/// Replaces the class rate table
///
/// Existing fee records keep the amounts they were generated with.
pub async fn update_class_fees(
    State(state): State<AppState>,
    payload: Result<Json<UpdateClassFeesRequest>, JsonRejection>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let Json(request) = payload?;
    let currency = state.config.currency;
    let table = request.into_table(currency)?;
    let classes = table.len();

    let settings = state.ports.settings.save_class_fees(currency, table).await?;
    info!(classes, "Class fees updated");
    Ok(Json(settings.into()))
}

/// Replaces the transport fee bands
pub async fn update_transport_bands(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTransportBandsRequest>, JsonRejection>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let Json(request) = payload?;
    let currency = state.config.currency;
    let bands = request.into_bands(currency)?;
    let count = bands.len();

    let settings = state
        .ports
        .settings
        .save_transport_bands(currency, bands)
        .await?;
    info!(bands = count, "Transport bands updated");
    Ok(Json(settings.into()))
}

/// Looks up the monthly transport fee for a distance
pub async fn transport_fee(
    State(state): State<AppState>,
    query: Result<Query<TransportFeeQuery>, QueryRejection>,
) -> Result<Json<TransportFeeResponse>, ApiError> {
    let Query(query) = query?;
    if query.distance_km.is_sign_negative() && !query.distance_km.is_zero() {
        return Err(ApiError::validation("distanceKm must not be negative"));
    }

    let settings = state.fee_schedules.load_settings().await?;
    Ok(Json(TransportFeeResponse {
        distance_km: query.distance_km,
        monthly_fee: settings
            .transport_bands
            .fee_for_distance(query.distance_km)
            .map(|fee| fee.amount()),
        currency: settings.currency,
    }))
}
