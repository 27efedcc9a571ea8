//! Distinct brands present in the spend dataset during the reporting window.

use sqlx::PgPool;
use spendcov_core::{BrandCatalog, BrandEntry, ReportingWindow};

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct BrandCatalogRow {
    brand_name: String,
    brand_id: Option<String>,
}

/// Returns the selectable brands, sorted by name then id in byte order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool, window: &ReportingWindow) -> Result<BrandCatalog, DbError> {
    let rows = sqlx::query_as::<_, BrandCatalogRow>(
        "SELECT brand_name, brand_id \
         FROM ( \
             SELECT DISTINCT s.brands AS brand_name, s.safegraph_brand_ids AS brand_id \
             FROM spend s \
             WHERE s.date_range_start >= $1 \
               AND s.date_range_start < $2 \
               AND s.brands IS NOT NULL \
               AND btrim(s.brands) <> '' \
         ) b \
         ORDER BY brand_name COLLATE \"C\", brand_id COLLATE \"C\" NULLS FIRST",
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await?;

    let entries = rows
        .into_iter()
        .map(|row| BrandEntry {
            name: row.brand_name,
            brand_id: row.brand_id,
        })
        .collect();

    Ok(BrandCatalog::new(entries))
}
