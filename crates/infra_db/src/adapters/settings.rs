//! PostgreSQL Fee Settings Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{
    ClassFeeId, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money, PortError,
    SettingsId, TransportBandId,
};
use domain_fees::{
    ClassFee, ClassFeeTable, FeeSettings, FeeSettingsPort, TransportFeeBand, TransportFeeBands,
};

use super::parse_currency;
use crate::error::DatabaseError;
use crate::repositories::settings::{
    ClassFeeRow, SettingsRepository, SettingsSnapshot, TransportBandRow,
};

/// PostgreSQL-backed implementation of `FeeSettingsPort`
#[derive(Debug, Clone)]
pub struct PostgresSettingsAdapter {
    repository: SettingsRepository,
    pool: PgPool,
}

impl PostgresSettingsAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SettingsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Current settings, or empty ones in `currency`
    ///
    /// Fails if stored settings use a different currency.
    async fn current_or_new(&self, currency: Currency) -> Result<FeeSettings, PortError> {
        match self.repository.load().await? {
            Some(snapshot) => {
                let settings = snapshot_to_settings(snapshot)?;
                if settings.currency != currency {
                    return Err(PortError::validation_field(
                        format!(
                            "fee settings are kept in {} and cannot be saved in {}",
                            settings.currency, currency
                        ),
                        "currency",
                    ));
                }
                Ok(settings)
            }
            None => Ok(FeeSettings::new(currency)),
        }
    }
}

impl DomainPort for PostgresSettingsAdapter {}

#[async_trait]
impl HealthCheckable for PostgresSettingsAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-settings-adapter").await
    }
}

#[async_trait]
impl FeeSettingsPort for PostgresSettingsAdapter {
    #[instrument(skip(self))]
    async fn load_settings(&self) -> Result<Option<FeeSettings>, PortError> {
        match self.repository.load().await? {
            Some(snapshot) => Ok(Some(snapshot_to_settings(snapshot)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, class_fees), fields(classes = class_fees.len()))]
    async fn save_class_fees(
        &self,
        currency: Currency,
        class_fees: ClassFeeTable,
    ) -> Result<FeeSettings, PortError> {
        let validated = self
            .current_or_new(currency)
            .await?
            .with_class_fees(class_fees)
            .map_err(|e| PortError::validation(e.to_string()))?;

        let rows: Vec<ClassFeeRow> = validated
            .class_fees
            .iter()
            .map(|fee| ClassFeeRow {
                class_fee_id: fee.id.into(),
                class_name: fee.class_name.clone(),
                tuition_fee: fee.tuition_fee.amount(),
                admission_fee: fee.admission_fee.amount(),
            })
            .collect();

        let snapshot = self
            .repository
            .replace_class_fees(currency.code(), &rows)
            .await?;
        info!(classes = rows.len(), "Class fees saved");
        Ok(snapshot_to_settings(snapshot)?)
    }

    #[instrument(skip(self, bands), fields(bands = bands.len()))]
    async fn save_transport_bands(
        &self,
        currency: Currency,
        bands: TransportFeeBands,
    ) -> Result<FeeSettings, PortError> {
        let validated = self
            .current_or_new(currency)
            .await?
            .with_transport_bands(bands)
            .map_err(|e| PortError::validation(e.to_string()))?;

        let rows: Vec<TransportBandRow> = validated
            .transport_bands
            .iter()
            .map(|band| TransportBandRow {
                band_id: band.id.into(),
                min_distance_km: band.min_distance_km,
                max_distance_km: band.max_distance_km,
                monthly_fee: band.monthly_fee.amount(),
            })
            .collect();

        let snapshot = self
            .repository
            .replace_transport_bands(currency.code(), &rows)
            .await?;
        info!(bands = rows.len(), "Transport bands saved");
        Ok(snapshot_to_settings(snapshot)?)
    }
}

fn snapshot_to_settings(snapshot: SettingsSnapshot) -> Result<FeeSettings, DatabaseError> {
    let currency = parse_currency(&snapshot.settings.currency)?;
    let invalid = |e: domain_fees::FeeError| DatabaseError::invalid_data(e.to_string());

    let class_fees = snapshot
        .class_fees
        .into_iter()
        .map(|row| {
            ClassFee::new(
                row.class_name,
                Money::new(row.tuition_fee, currency),
                Money::new(row.admission_fee, currency),
            )
            .map(|fee| fee.with_id(ClassFeeId::from_uuid(row.class_fee_id)))
        })
        .collect::<Result<Vec<_>, _>>()
        .and_then(ClassFeeTable::new)
        .map_err(invalid)?;

    let transport_bands = snapshot
        .transport_bands
        .into_iter()
        .map(|row| {
            TransportFeeBand::new(
                row.min_distance_km,
                row.max_distance_km,
                Money::new(row.monthly_fee, currency),
            )
            .map(|band| band.with_id(TransportBandId::from_uuid(row.band_id)))
        })
        .collect::<Result<Vec<_>, _>>()
        .and_then(TransportFeeBands::new)
        .map_err(invalid)?;

    Ok(FeeSettings {
        id: SettingsId::from_uuid(snapshot.settings.settings_id),
        currency,
        class_fees,
        transport_bands,
        updated_at: snapshot.settings.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::settings::FeeSettingsRow;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn snapshot(class_fees: Vec<ClassFeeRow>) -> SettingsSnapshot {
        SettingsSnapshot {
            settings: FeeSettingsRow {
                settings_id: Uuid::now_v7(),
                currency: "INR".to_string(),
                updated_at: Utc::now(),
            },
            class_fees,
            transport_bands: vec![TransportBandRow {
                band_id: Uuid::now_v7(),
                min_distance_km: dec!(0),
                max_distance_km: dec!(5),
                monthly_fee: dec!(800),
            }],
        }
    }

    fn class_row(name: &str) -> ClassFeeRow {
        ClassFeeRow {
            class_fee_id: Uuid::now_v7(),
            class_name: name.to_string(),
            tuition_fee: dec!(5000),
            admission_fee: dec!(2000),
        }
    }

    #[test]
    fn test_snapshot_becomes_settings() {
        let settings = snapshot_to_settings(snapshot(vec![class_row("Class 5")])).unwrap();
        assert_eq!(settings.currency, Currency::INR);
        assert_eq!(
            settings.class_fee("class 5").unwrap().tuition_fee,
            Money::new(dec!(5000), Currency::INR)
        );
        assert_eq!(
            settings.transport_bands.fee_for_distance(dec!(3)),
            Some(Money::new(dec!(800), Currency::INR))
        );
    }

    #[test]
    fn test_duplicate_stored_classes_are_invalid_data() {
        let result = snapshot_to_settings(snapshot(vec![class_row("Class 5"), class_row("CLASS 5")]));
        assert!(matches!(result, Err(DatabaseError::InvalidData(_))));
    }
}
