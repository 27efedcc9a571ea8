//! Warehouse records and the YAML fixture format used to seed a development
//! warehouse.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One point of interest in the core registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub placekey: String,
    /// Comma-separated registry brand ids, e.g. `"SG_BRAND_3b6e6d5b2c5f0a0c"`.
    #[serde(default)]
    pub safegraph_brand_ids: Option<String>,
    /// Comma-separated brand names, e.g. `"McDonald's"`.
    #[serde(default)]
    pub brands: Option<String>,
    pub location_name: String,
    #[serde(default)]
    pub top_category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub opened_on: Option<NaiveDate>,
    /// Set once the place is permanently closed.
    #[serde(default)]
    pub closed_on: Option<NaiveDate>,
}

/// Visit activity for one place in one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub placekey: String,
    pub date_range_start: NaiveDate,
    #[serde(default)]
    pub date_range_end: Option<NaiveDate>,
    #[serde(default)]
    pub raw_visit_counts: Option<i64>,
}

/// Transaction-derived spend for one place in one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub placekey: String,
    #[serde(default)]
    pub safegraph_brand_ids: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    pub date_range_start: NaiveDate,
    #[serde(default)]
    pub date_range_end: Option<NaiveDate>,
    #[serde(default)]
    pub closed_on: Option<NaiveDate>,
    #[serde(default)]
    pub raw_num_transactions: Option<i64>,
    #[serde(default)]
    pub median_spend_per_transaction: Option<Decimal>,
    #[serde(default)]
    pub raw_total_spend: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub patterns: Vec<PatternRecord>,
    #[serde(default)]
    pub spend: Vec<SpendRecord>,
}

/// Load and validate a warehouse fixture from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_fixture(path: &Path) -> Result<FixtureFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FixtureFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let fixture: FixtureFile = serde_yaml::from_str(&content)?;

    validate_fixture(&fixture)?;

    Ok(fixture)
}

/// Check that placekeys are present and unique, and that every pattern and
/// spend record refers to a known place exactly once per period.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] describing the first violation found.
pub fn validate_fixture(fixture: &FixtureFile) -> Result<(), ConfigError> {
    let mut placekeys = HashSet::new();
    for place in &fixture.places {
        if place.placekey.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "place '{}' has an empty placekey",
                place.location_name
            )));
        }
        if !placekeys.insert(place.placekey.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate placekey: '{}'",
                place.placekey
            )));
        }
    }

    let mut seen_patterns = HashSet::new();
    for record in &fixture.patterns {
        if !placekeys.contains(record.placekey.as_str()) {
            return Err(ConfigError::Validation(format!(
                "patterns record references unknown placekey '{}'",
                record.placekey
            )));
        }
        if !seen_patterns.insert((record.placekey.as_str(), record.date_range_start)) {
            return Err(ConfigError::Validation(format!(
                "duplicate patterns record for '{}' starting {}",
                record.placekey, record.date_range_start
            )));
        }
    }

    let mut seen_spend = HashSet::new();
    for record in &fixture.spend {
        if !placekeys.contains(record.placekey.as_str()) {
            return Err(ConfigError::Validation(format!(
                "spend record references unknown placekey '{}'",
                record.placekey
            )));
        }
        if !seen_spend.insert((record.placekey.as_str(), record.date_range_start)) {
            return Err(ConfigError::Validation(format!(
                "duplicate spend record for '{}' starting {}",
                record.placekey, record.date_range_start
            )));
        }
        if record.raw_num_transactions.is_some_and(|n| n < 0) {
            return Err(ConfigError::Validation(format!(
                "spend record for '{}' has a negative transaction count",
                record.placekey
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "fixture_test.rs"]
mod tests;
