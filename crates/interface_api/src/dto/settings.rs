//! Fee settings DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::Currency;
use domain_fees::{ClassFee, ClassFeeTable, FeeSettings, TransportFeeBand, TransportFeeBands};

use crate::dto::fees::to_money;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeeInput {
    #[validate(length(min = 1, max = 50))]
    pub class_name: String,
    pub tuition_fee: Decimal,
    pub admission_fee: Decimal,
}

/// Replaces the whole class rate table
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassFeesRequest {
    pub class_fees: Vec<ClassFeeInput>,
}

impl UpdateClassFeesRequest {
    pub fn into_table(self, currency: Currency) -> Result<ClassFeeTable, ApiError> {
        let mut fees = Vec::with_capacity(self.class_fees.len());
        for input in self.class_fees {
            input.validate()?;
            let fee = ClassFee::new(
                input.class_name,
                to_money(input.tuition_fee, currency, "tuitionFee")?,
                to_money(input.admission_fee, currency, "admissionFee")?,
            )?;
            fees.push(fee);
        }
        Ok(ClassFeeTable::new(fees)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportBandInput {
    pub min_distance_km: Decimal,
    pub max_distance_km: Decimal,
    pub monthly_fee: Decimal,
}

/// Replaces every transport band
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransportBandsRequest {
    pub transport_bands: Vec<TransportBandInput>,
}

impl UpdateTransportBandsRequest {
    pub fn into_bands(self, currency: Currency) -> Result<TransportFeeBands, ApiError> {
        let bands = self
            .transport_bands
            .into_iter()
            .map(|input| {
                let fee = to_money(input.monthly_fee, currency, "monthlyFee")?;
                Ok(TransportFeeBand::new(input.min_distance_km, input.max_distance_km, fee)?)
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(TransportFeeBands::new(bands)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportFeeQuery {
    pub distance_km: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeeResponse {
    pub class_name: String,
    pub tuition_fee: Decimal,
    pub admission_fee: Decimal,
    pub first_year_total: Decimal,
}

impl From<&ClassFee> for ClassFeeResponse {
    fn from(fee: &ClassFee) -> Self {
        Self {
            class_name: fee.class_name.clone(),
            tuition_fee: fee.tuition_fee.amount(),
            admission_fee: fee.admission_fee.amount(),
            first_year_total: fee.first_year_total().amount(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportBandResponse {
    pub min_distance_km: Decimal,
    pub max_distance_km: Decimal,
    pub monthly_fee: Decimal,
}

impl From<&TransportFeeBand> for TransportBandResponse {
    fn from(band: &TransportFeeBand) -> Self {
        Self {
            min_distance_km: band.min_distance_km,
            max_distance_km: band.max_distance_km,
            monthly_fee: band.monthly_fee.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub currency: Currency,
    pub class_fees: Vec<ClassFeeResponse>,
    pub transport_bands: Vec<TransportBandResponse>,
    pub updated_at: DateTime<Utc>,
}

impl From<FeeSettings> for SettingsResponse {
    fn from(settings: FeeSettings) -> Self {
        Self {
            currency: settings.currency,
            class_fees: settings.class_fees.iter().map(Into::into).collect(),
            transport_bands: settings.transport_bands.iter().map(Into::into).collect(),
            updated_at: settings.updated_at,
        }
    }
}

/// Monthly transport fee for a distance; `monthlyFee` is null when no band
/// covers it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportFeeResponse {
    pub distance_km: Decimal,
    pub monthly_fee: Option<Decimal>,
    pub currency: Currency,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overlapping_bands_rejected() {
        let request = UpdateTransportBandsRequest {
            transport_bands: vec![
                TransportBandInput {
                    min_distance_km: dec!(0),
                    max_distance_km: dec!(5),
                    monthly_fee: dec!(800),
                },
                TransportBandInput {
                    min_distance_km: dec!(4),
                    max_distance_km: dec!(10),
                    monthly_fee: dec!(1200),
                },
            ],
        };
        assert!(matches!(
            request.into_bands(Currency::INR),
            Err(ApiError::Validation(..))
        ));
    }

    #[test]
    fn test_blank_class_name_rejected() {
        let request = UpdateClassFeesRequest {
            class_fees: vec![ClassFeeInput {
                class_name: String::new(),
                tuition_fee: dec!(4000),
                admission_fee: dec!(2000),
            }],
        };
        assert!(request.into_table(Currency::INR).is_err());
    }
}
