//! Row-level spend records for the selected brand.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use spendcov_core::{CoverageOptions, Histogram, HISTOGRAM_BINS};

use crate::DbError;

/// One row per place: the latest spend period inside the reporting window.
pub(crate) const SPEND_ROWS_SQL: &str = concat!(
    "SELECT DISTINCT ON (s.placekey) \
         s.placekey, s.safegraph_brand_ids, s.brands, \
         s.date_range_start, s.date_range_end, s.closed_on, \
         s.raw_num_transactions, s.median_spend_per_transaction, s.raw_total_spend \
     FROM spend s \
     JOIN core_places c ON c.placekey = s.placekey \
     WHERE s.date_range_start >= $1 \
       AND s.date_range_start < $2 \
       AND ",
    core_scope_predicate!(),
    " ORDER BY s.placekey, s.date_range_start DESC"
);

/// A row from the `spend` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SpendRow {
    pub placekey: String,
    pub safegraph_brand_ids: Option<String>,
    pub brands: Option<String>,
    pub date_range_start: NaiveDate,
    pub date_range_end: Option<NaiveDate>,
    pub closed_on: Option<NaiveDate>,
    pub raw_num_transactions: Option<i64>,
    pub median_spend_per_transaction: Option<Decimal>,
    pub raw_total_spend: Option<Decimal>,
}

/// Returns spend rows for places in the core registry matching `brand_filter`,
/// ordered by placekey.
///
/// Uses the same core predicate as [`crate::count_coverage`], so the number
/// of rows equals the coverage query's `spend_count` for the same filter.
/// A filter containing NUL matches nothing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_spend_rows(
    pool: &PgPool,
    options: &CoverageOptions,
    brand_filter: &str,
) -> Result<Vec<SpendRow>, DbError> {
    if brand_filter.contains('\0') {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, SpendRow>(SPEND_ROWS_SQL)
        .bind(options.window.start)
        .bind(options.window.end)
        .bind(options.closure_filter.includes_closed())
        .bind(brand_filter)
        .bind(options.brand_key.as_str())
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Distribution of `raw_num_transactions`; rows without a count are skipped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn transactions_histogram(rows: &[SpendRow]) -> Histogram {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.raw_num_transactions)
        .map(|n| n as f64)
        .collect();
    Histogram::from_values(&values, HISTOGRAM_BINS)
}

/// Distribution of `median_spend_per_transaction`; rows without a median are skipped.
#[must_use]
pub fn median_spend_histogram(rows: &[SpendRow]) -> Histogram {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.median_spend_per_transaction)
        .filter_map(|d| d.to_f64())
        .collect();
    Histogram::from_values(&values, HISTOGRAM_BINS)
}
