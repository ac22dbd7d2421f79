//! Fee settings repository implementation
//!
//! The `fee_settings` table holds at most one row (enforced by its
//! `singleton` column). Class fees and transport bands hang off it and are
//! always replaced as a whole.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FeeSettingsRow {
    pub settings_id: Uuid,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ClassFeeRow {
    pub class_fee_id: Uuid,
    pub class_name: String,
    pub tuition_fee: Decimal,
    pub admission_fee: Decimal,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TransportBandRow {
    pub band_id: Uuid,
    pub min_distance_km: Decimal,
    pub max_distance_km: Decimal,
    pub monthly_fee: Decimal,
}

/// Everything stored for the school's settings
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsSnapshot {
    pub settings: FeeSettingsRow,
    pub class_fees: Vec<ClassFeeRow>,
    pub transport_bands: Vec<TransportBandRow>,
}

/// Repository for the settings record and its rate tables
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the settings with their class fees (in saved order) and bands
    /// (by lower bound)
    pub async fn load(&self) -> Result<Option<SettingsSnapshot>, DatabaseError> {
        let settings = sqlx::query_as::<_, FeeSettingsRow>(
            "SELECT settings_id, currency, updated_at FROM fee_settings LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(settings) = settings else {
            return Ok(None);
        };

        let class_fees = sqlx::query_as::<_, ClassFeeRow>(
            "SELECT class_fee_id, class_name, tuition_fee, admission_fee \
             FROM class_fees WHERE settings_id = $1 ORDER BY position, class_name",
        )
        .bind(settings.settings_id)
        .fetch_all(&self.pool)
        .await?;

        let transport_bands = sqlx::query_as::<_, TransportBandRow>(
            "SELECT band_id, min_distance_km, max_distance_km, monthly_fee \
             FROM transport_fee_bands WHERE settings_id = $1 ORDER BY min_distance_km",
        )
        .bind(settings.settings_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SettingsSnapshot {
            settings,
            class_fees,
            transport_bands,
        }))
    }

    /// Replaces every class fee row, creating the settings row in
    /// `currency` when none exists
    pub async fn replace_class_fees(
        &self,
        currency: &str,
        rows: &[ClassFeeRow],
    ) -> Result<SettingsSnapshot, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let settings = Self::lock_settings(&mut tx, currency).await?;

        sqlx::query("DELETE FROM class_fees WHERE settings_id = $1")
            .bind(settings.settings_id)
            .execute(&mut *tx)
            .await?;

        if !rows.is_empty() {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO class_fees \
                 (class_fee_id, settings_id, class_name, tuition_fee, admission_fee, position) ",
            );
            builder.push_values(rows.iter().enumerate(), |mut b, (position, row)| {
                b.push_bind(row.class_fee_id)
                    .push_bind(settings.settings_id)
                    .push_bind(row.class_name.clone())
                    .push_bind(row.tuition_fee)
                    .push_bind(row.admission_fee)
                    .push_bind(position as i32);
            });
            builder.build().execute(&mut *tx).await?;
        }

        Self::touch(&mut tx, settings.settings_id).await?;
        tx.commit().await?;

        self.load()
            .await?
            .ok_or_else(|| DatabaseError::not_found("FeeSettings", settings.settings_id))
    }

    /// Replaces every transport band row, creating the settings row in
    /// `currency` when none exists
    pub async fn replace_transport_bands(
        &self,
        currency: &str,
        rows: &[TransportBandRow],
    ) -> Result<SettingsSnapshot, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let settings = Self::lock_settings(&mut tx, currency).await?;

        sqlx::query("DELETE FROM transport_fee_bands WHERE settings_id = $1")
            .bind(settings.settings_id)
            .execute(&mut *tx)
            .await?;

        if !rows.is_empty() {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO transport_fee_bands \
                 (band_id, settings_id, min_distance_km, max_distance_km, monthly_fee) ",
            );
            builder.push_values(rows, |mut b, row| {
                b.push_bind(row.band_id)
                    .push_bind(settings.settings_id)
                    .push_bind(row.min_distance_km)
                    .push_bind(row.max_distance_km)
                    .push_bind(row.monthly_fee);
            });
            builder.build().execute(&mut *tx).await?;
        }

        Self::touch(&mut tx, settings.settings_id).await?;
        tx.commit().await?;

        self.load()
            .await?
            .ok_or_else(|| DatabaseError::not_found("FeeSettings", settings.settings_id))
    }

    /// Creates the settings row if missing and locks it for the rest of
    /// the transaction
    async fn lock_settings(
        tx: &mut Transaction<'_, Postgres>,
        currency: &str,
    ) -> Result<FeeSettingsRow, DatabaseError> {
        sqlx::query(
            "INSERT INTO fee_settings (settings_id, currency, updated_at) \
             VALUES ($1, $2, NOW()) ON CONFLICT (singleton) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(currency)
        .execute(&mut **tx)
        .await?;

        let settings = sqlx::query_as::<_, FeeSettingsRow>(
            "SELECT settings_id, currency, updated_at FROM fee_settings LIMIT 1 FOR UPDATE",
        )
        .fetch_one(&mut **tx)
        .await?;

        if settings.currency != currency {
            return Err(DatabaseError::ConstraintViolation(format!(
                "settings are kept in {} but {} was supplied",
                settings.currency, currency
            )));
        }
        Ok(settings)
    }

    async fn touch(tx: &mut Transaction<'_, Postgres>, settings_id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE fee_settings SET updated_at = NOW() WHERE settings_id = $1")
            .bind(settings_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
