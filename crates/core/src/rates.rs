//! The rate table: versioned, immutable pricing configuration loaded once
//! at process start from a JSON document. A malformed or missing table is
//! the only fatal condition in the system and belongs to startup; the
//! per-quote engine never reloads or mutates it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub end_of_tenancy: TenancyRates,
    pub airbnb_turnover: TurnoverRates,
    pub communal: CommunalRates,
    pub general_clean: GeneralCleanRates,
    pub carpet: CarpetRates,
    #[serde(default)]
    pub optional_addons: BTreeMap<String, Decimal>,
    pub surcharges: SurchargeRates,
    #[serde(default)]
    pub promo_codes: BTreeMap<String, PromoCode>,
    pub min_charge: Decimal,
    pub vat: Decimal,
    /// Whether the pets flag carries a surcharge or is a non-pricing note.
    #[serde(default = "default_true")]
    pub pets_affect_price: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TenancyRates {
    pub base: BTreeMap<String, Decimal>,
    pub extra_bathroom: Decimal,
    pub extra_wc: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnoverRates {
    pub base: BTreeMap<String, Decimal>,
    pub extra_bathroom: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommunalRates {
    pub base: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub frequency_discounts: BTreeMap<String, Decimal>,
    pub extras: CommunalExtras,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommunalExtras {
    pub lift: Decimal,
    pub bin_store: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneralCleanRates {
    pub one_off_min: Decimal,
    #[serde(default)]
    pub recurring_discounts: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarpetRates {
    pub room: Decimal,
    pub lounge: Decimal,
    pub bedroom: Decimal,
    pub landing_hall: Decimal,
    pub stairs_per_step: Decimal,
    pub stairs_flat: Decimal,
    pub rug_small: Decimal,
    pub rug_large: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurchargeRates {
    pub pets: Decimal,
    pub urgent_same_day: Decimal,
    pub congestion: Decimal,
    pub parking_flat: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    pub active: bool,
    pub percent: Decimal,
}

fn default_true() -> bool {
    true
}

/// Outcome of a size/category lookup. An absent key zero-rates rather than
/// erroring: the quote must survive a stale table, surfacing a visibly
/// wrong zero line for a human to correct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLookup {
    Found(Decimal),
    Missing,
}

impl RateLookup {
    pub fn amount(self) -> Decimal {
        match self {
            Self::Found(amount) => amount,
            Self::Missing => Decimal::ZERO,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }
}

pub fn lookup(table: &BTreeMap<String, Decimal>, key: &str) -> RateLookup {
    match table.get(key) {
        Some(amount) => RateLookup::Found(*amount),
        None => RateLookup::Missing,
    }
}

#[derive(Debug, Error)]
pub enum RateTableError {
    #[error("could not read rate table `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse rate table `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("rate table validation failed: {0}")]
    Validation(String),
}

impl RateTable {
    pub fn load(path: &Path) -> Result<Self, RateTableError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| RateTableError::ReadFile { path: path.to_path_buf(), source })?;
        let table: Self = serde_json::from_str(&raw)
            .map_err(|source| RateTableError::ParseFile { path: path.to_path_buf(), source })?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), RateTableError> {
        validate_prices("end_of_tenancy.base", self.end_of_tenancy.base.values())?;
        validate_price("end_of_tenancy.extra_bathroom", self.end_of_tenancy.extra_bathroom)?;
        validate_price("end_of_tenancy.extra_wc", self.end_of_tenancy.extra_wc)?;
        validate_prices("airbnb_turnover.base", self.airbnb_turnover.base.values())?;
        validate_price("airbnb_turnover.extra_bathroom", self.airbnb_turnover.extra_bathroom)?;
        validate_prices("communal.base", self.communal.base.values())?;
        validate_fractions(
            "communal.frequency_discounts",
            self.communal.frequency_discounts.values(),
        )?;
        validate_price("communal.extras.lift", self.communal.extras.lift)?;
        validate_price("communal.extras.bin_store", self.communal.extras.bin_store)?;
        validate_price("general_clean.one_off_min", self.general_clean.one_off_min)?;
        validate_fractions(
            "general_clean.recurring_discounts",
            self.general_clean.recurring_discounts.values(),
        )?;
        for (name, unit) in self.carpet.units() {
            validate_price(&format!("carpet.{name}"), unit)?;
        }
        validate_prices("optional_addons", self.optional_addons.values())?;
        validate_price("surcharges.pets", self.surcharges.pets)?;
        validate_price("surcharges.urgent_same_day", self.surcharges.urgent_same_day)?;
        validate_price("surcharges.congestion", self.surcharges.congestion)?;
        validate_price("surcharges.parking_flat", self.surcharges.parking_flat)?;
        for (code, promo) in &self.promo_codes {
            if promo.percent < Decimal::ZERO || promo.percent > Decimal::ONE_HUNDRED {
                return Err(RateTableError::Validation(format!(
                    "promo_codes.{code}.percent must be in range 0..=100"
                )));
            }
        }
        validate_price("min_charge", self.min_charge)?;
        if self.vat < Decimal::ZERO || self.vat >= Decimal::ONE {
            return Err(RateTableError::Validation(
                "vat must be a fraction in range [0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}

impl CarpetRates {
    pub fn units(&self) -> [(&'static str, Decimal); 8] {
        [
            ("room", self.room),
            ("lounge", self.lounge),
            ("bedroom", self.bedroom),
            ("landing_hall", self.landing_hall),
            ("stairs_per_step", self.stairs_per_step),
            ("stairs_flat", self.stairs_flat),
            ("rug_small", self.rug_small),
            ("rug_large", self.rug_large),
        ]
    }
}

fn validate_price(name: &str, value: Decimal) -> Result<(), RateTableError> {
    if value < Decimal::ZERO {
        return Err(RateTableError::Validation(format!("{name} must be non-negative")));
    }
    Ok(())
}

fn validate_prices<'a>(
    name: &str,
    values: impl Iterator<Item = &'a Decimal>,
) -> Result<(), RateTableError> {
    for value in values {
        validate_price(name, *value)?;
    }
    Ok(())
}

fn validate_fractions<'a>(
    name: &str,
    values: impl Iterator<Item = &'a Decimal>,
) -> Result<(), RateTableError> {
    for value in values {
        if *value < Decimal::ZERO || *value >= Decimal::ONE {
            return Err(RateTableError::Validation(format!(
                "{name} entries must be fractions in range [0, 1)"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal::Decimal;

    use super::{lookup, RateLookup, RateTable, RateTableError};
    use crate::pricing::tests::fixture_rates;

    #[test]
    fn lookup_reports_missing_keys_explicitly() {
        let rates = fixture_rates();
        assert!(matches!(lookup(&rates.end_of_tenancy.base, "2_bed"), RateLookup::Found(_)));

        let missing = lookup(&rates.end_of_tenancy.base, "9_bed");
        assert!(missing.is_missing());
        assert_eq!(missing.amount(), Decimal::ZERO);
    }

    #[test]
    fn load_round_trips_a_serialized_table() {
        let rates = fixture_rates();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = serde_json::to_string(&rates).expect("serialize");
        file.write_all(json.as_bytes()).expect("write");

        let loaded = RateTable::load(file.path()).expect("load should succeed");
        assert_eq!(loaded, rates);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let error = RateTable::load(std::path::Path::new("does-not-exist.json"))
            .expect_err("load should fail");
        assert!(matches!(error, RateTableError::ReadFile { .. }));
    }

    #[test]
    fn validation_rejects_negative_prices() {
        let mut rates = fixture_rates();
        rates.surcharges.pets = Decimal::new(-100, 2);
        let error = rates.validate().expect_err("validation should fail");
        assert!(error.to_string().contains("surcharges.pets"));
    }

    #[test]
    fn validation_rejects_out_of_range_discount_fractions() {
        let mut rates = fixture_rates();
        rates.communal.frequency_discounts.insert("weekly".to_string(), Decimal::ONE);
        let error = rates.validate().expect_err("validation should fail");
        assert!(error.to_string().contains("communal.frequency_discounts"));
    }

    #[test]
    fn validation_rejects_vat_of_one_or_more() {
        let mut rates = fixture_rates();
        rates.vat = Decimal::ONE;
        assert!(rates.validate().is_err());
    }

    #[test]
    fn pets_affect_price_defaults_to_true() {
        let rates = fixture_rates();
        let json = serde_json::to_value(&rates).expect("serialize");
        let mut doc = json.as_object().expect("object").clone();
        doc.remove("pets_affect_price");

        let parsed: RateTable =
            serde_json::from_value(serde_json::Value::Object(doc)).expect("parse");
        assert!(parsed.pets_affect_price);
    }
}
