//! Fee settings
//!
//! The school keeps a single settings record holding the class rate table
//! and the transport fee bands. Services load it once and pass it to the
//! schedule generator explicitly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClassFeeId, Currency, Money, SettingsId, TransportBandId};

use crate::error::FeeError;

/// Normalizes a class name for lookups: trimmed, lowercased, single spaces
pub fn normalize_class_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fee rates for one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFee {
    /// Unique identifier
    pub id: ClassFeeId,
    /// Class name as displayed (e.g. "Class 5")
    pub class_name: String,
    /// Monthly tuition fee
    pub tuition_fee: Money,
    /// One-time admission fee
    pub admission_fee: Money,
}

impl ClassFee {
    /// Creates a class fee, rejecting blank names, negative amounts and
    /// mixed currencies
    pub fn new(
        class_name: impl Into<String>,
        tuition_fee: Money,
        admission_fee: Money,
    ) -> Result<Self, FeeError> {
        let class_name = class_name.into().trim().to_string();
        if class_name.is_empty() {
            return Err(FeeError::InvalidSettings("class name must not be empty".to_string()));
        }
        if tuition_fee.is_negative() || admission_fee.is_negative() {
            return Err(FeeError::InvalidSettings(format!(
                "fees for '{}' must not be negative",
                class_name
            )));
        }
        if tuition_fee.currency() != admission_fee.currency() {
            return Err(FeeError::InvalidSettings(format!(
                "fees for '{}' use different currencies",
                class_name
            )));
        }

        Ok(Self {
            id: ClassFeeId::new_v7(),
            class_name,
            tuition_fee,
            admission_fee,
        })
    }

    /// Sets the identifier (used when loading from storage)
    pub fn with_id(mut self, id: ClassFeeId) -> Self {
        self.id = id;
        self
    }

    /// Total charged for a full year including admission
    pub fn first_year_total(&self) -> Money {
        self.tuition_fee.times(12) + self.admission_fee
    }
}

/// The per-class rate table
///
/// Class names are unique after normalization, so "Class 5" and
/// " class  5 " refer to the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClassFee>", into = "Vec<ClassFee>")]
pub struct ClassFeeTable {
    fees: Vec<ClassFee>,
}

impl ClassFeeTable {
    /// Builds a table, rejecting duplicate class names
    pub fn new(fees: Vec<ClassFee>) -> Result<Self, FeeError> {
        let mut seen = std::collections::HashSet::new();
        for fee in &fees {
            if !seen.insert(normalize_class_name(&fee.class_name)) {
                return Err(FeeError::InvalidSettings(format!(
                    "class '{}' is listed more than once",
                    fee.class_name
                )));
            }
        }
        Ok(Self { fees })
    }

    /// Looks up a class by name
    pub fn find(&self, class_name: &str) -> Option<&ClassFee> {
        let wanted = normalize_class_name(class_name);
        self.fees
            .iter()
            .find(|fee| normalize_class_name(&fee.class_name) == wanted)
    }

    /// Returns true if the class has a configured fee
    pub fn contains(&self, class_name: &str) -> bool {
        self.find(class_name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassFee> {
        self.fees.iter()
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }
}

impl TryFrom<Vec<ClassFee>> for ClassFeeTable {
    type Error = FeeError;

    fn try_from(fees: Vec<ClassFee>) -> Result<Self, Self::Error> {
        ClassFeeTable::new(fees)
    }
}

impl From<ClassFeeTable> for Vec<ClassFee> {
    fn from(table: ClassFeeTable) -> Self {
        table.fees
    }
}

/// A distance band with its monthly transport fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFeeBand {
    /// Unique identifier
    pub id: TransportBandId,
    /// Lower bound in kilometres (inclusive)
    pub min_distance_km: Decimal,
    /// Upper bound in kilometres (inclusive)
    pub max_distance_km: Decimal,
    /// Monthly fee for students in this band
    pub monthly_fee: Money,
}

impl TransportFeeBand {
    pub fn new(
        min_distance_km: Decimal,
        max_distance_km: Decimal,
        monthly_fee: Money,
    ) -> Result<Self, FeeError> {
        if min_distance_km.is_sign_negative() && !min_distance_km.is_zero() {
            return Err(FeeError::InvalidSettings(
                "band distance must not be negative".to_string(),
            ));
        }
        if min_distance_km > max_distance_km {
            return Err(FeeError::InvalidSettings(format!(
                "band {}-{} km has its bounds reversed",
                min_distance_km, max_distance_km
            )));
        }
        if monthly_fee.is_negative() {
            return Err(FeeError::InvalidSettings(
                "transport fee must not be negative".to_string(),
            ));
        }

        Ok(Self {
            id: TransportBandId::new_v7(),
            min_distance_km,
            max_distance_km,
            monthly_fee,
        })
    }

    pub fn with_id(mut self, id: TransportBandId) -> Self {
        self.id = id;
        self
    }

    pub fn covers(&self, distance_km: Decimal) -> bool {
        distance_km >= self.min_distance_km && distance_km <= self.max_distance_km
    }
}

/// Transport fee bands, kept sorted by lower bound with no overlaps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TransportFeeBand>", into = "Vec<TransportFeeBand>")]
pub struct TransportFeeBands {
    bands: Vec<TransportFeeBand>,
}

impl TransportFeeBands {
    pub fn new(mut bands: Vec<TransportFeeBand>) -> Result<Self, FeeError> {
        bands.sort_by(|a, b| a.min_distance_km.cmp(&b.min_distance_km));

        for pair in bands.windows(2) {
            if pair[1].min_distance_km <= pair[0].max_distance_km {
                return Err(FeeError::InvalidSettings(format!(
                    "transport bands {}-{} km and {}-{} km overlap",
                    pair[0].min_distance_km,
                    pair[0].max_distance_km,
                    pair[1].min_distance_km,
                    pair[1].max_distance_km
                )));
            }
        }

        Ok(Self { bands })
    }

    /// Returns the band covering the distance, if any
    pub fn band_for_distance(&self, distance_km: Decimal) -> Option<&TransportFeeBand> {
        self.bands.iter().find(|band| band.covers(distance_km))
    }

    /// Returns the monthly fee for the distance, if a band covers it
    pub fn fee_for_distance(&self, distance_km: Decimal) -> Option<Money> {
        self.band_for_distance(distance_km).map(|band| band.monthly_fee)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransportFeeBand> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl TryFrom<Vec<TransportFeeBand>> for TransportFeeBands {
    type Error = FeeError;

    fn try_from(bands: Vec<TransportFeeBand>) -> Result<Self, Self::Error> {
        TransportFeeBands::new(bands)
    }
}

impl From<TransportFeeBands> for Vec<TransportFeeBand> {
    fn from(bands: TransportFeeBands) -> Self {
        bands.bands
    }
}

/// The school's fee settings snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSettings {
    /// Unique identifier
    pub id: SettingsId,
    /// Currency all fees are charged in
    pub currency: Currency,
    /// Per-class tuition and admission fees
    pub class_fees: ClassFeeTable,
    /// Transport fee bands
    pub transport_bands: TransportFeeBands,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl FeeSettings {
    /// Creates empty settings in the given currency
    pub fn new(currency: Currency) -> Self {
        Self {
            id: SettingsId::new_v7(),
            currency,
            class_fees: ClassFeeTable::default(),
            transport_bands: TransportFeeBands::default(),
            updated_at: Utc::now(),
        }
    }

    /// Replaces the class rate table, checking every amount uses the
    /// settings currency
    pub fn with_class_fees(mut self, class_fees: ClassFeeTable) -> Result<Self, FeeError> {
        if let Some(fee) = class_fees
            .iter()
            .find(|fee| fee.tuition_fee.currency() != self.currency)
        {
            return Err(FeeError::InvalidSettings(format!(
                "class '{}' is priced in {} but the school charges in {}",
                fee.class_name,
                fee.tuition_fee.currency(),
                self.currency
            )));
        }
        self.class_fees = class_fees;
        self.updated_at = Utc::now();
        Ok(self)
    }

    /// Replaces the transport bands
    pub fn with_transport_bands(mut self, bands: TransportFeeBands) -> Result<Self, FeeError> {
        if let Some(band) = bands
            .iter()
            .find(|band| band.monthly_fee.currency() != self.currency)
        {
            return Err(FeeError::InvalidSettings(format!(
                "transport band priced in {} but the school charges in {}",
                band.monthly_fee.currency(),
                self.currency
            )));
        }
        self.transport_bands = bands;
        self.updated_at = Utc::now();
        Ok(self)
    }

    /// Looks up a class fee, failing with `ClassFeeNotFound`
    pub fn class_fee(&self, class_name: &str) -> Result<&ClassFee, FeeError> {
        self.class_fees
            .find(class_name)
            .ok_or_else(|| FeeError::ClassFeeNotFound(class_name.to_string()))
    }
}
