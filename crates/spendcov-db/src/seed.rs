use sqlx::PgPool;
use spendcov_core::FixtureFile;

use crate::DbError;

/// Row counts written by [`seed_fixture`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub places: usize,
    pub patterns: usize,
    pub spend: usize,
}

/// Upsert every record of a fixture into the warehouse tables.
///
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_fixture(pool: &PgPool, fixture: &FixtureFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for place in &fixture.places {
        sqlx::query(
            "INSERT INTO core_places \
               (placekey, safegraph_brand_ids, brands, location_name, top_category, \
                city, region, opened_on, closed_on) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (placekey) DO UPDATE SET \
                 safegraph_brand_ids = EXCLUDED.safegraph_brand_ids, \
                 brands = EXCLUDED.brands, \
                 location_name = EXCLUDED.location_name, \
                 top_category = EXCLUDED.top_category, \
                 city = EXCLUDED.city, \
                 region = EXCLUDED.region, \
                 opened_on = EXCLUDED.opened_on, \
                 closed_on = EXCLUDED.closed_on",
        )
        .bind(&place.placekey)
        .bind(&place.safegraph_brand_ids)
        .bind(&place.brands)
        .bind(&place.location_name)
        .bind(&place.top_category)
        .bind(&place.city)
        .bind(&place.region)
        .bind(place.opened_on)
        .bind(place.closed_on)
        .execute(&mut *tx)
        .await?;
        summary.places += 1;
    }

    for record in &fixture.patterns {
        sqlx::query(
            "INSERT INTO patterns (placekey, date_range_start, date_range_end, raw_visit_counts) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (placekey, date_range_start) DO UPDATE SET \
                 date_range_end = EXCLUDED.date_range_end, \
                 raw_visit_counts = EXCLUDED.raw_visit_counts",
        )
        .bind(&record.placekey)
        .bind(record.date_range_start)
        .bind(record.date_range_end)
        .bind(record.raw_visit_counts)
        .execute(&mut *tx)
        .await?;
        summary.patterns += 1;
    }

    for record in &fixture.spend {
        sqlx::query(
            "INSERT INTO spend \
               (placekey, safegraph_brand_ids, brands, date_range_start, date_range_end, \
                closed_on, raw_num_transactions, median_spend_per_transaction, raw_total_spend) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (placekey, date_range_start) DO UPDATE SET \
                 safegraph_brand_ids = EXCLUDED.safegraph_brand_ids, \
                 brands = EXCLUDED.brands, \
                 date_range_end = EXCLUDED.date_range_end, \
                 closed_on = EXCLUDED.closed_on, \
                 raw_num_transactions = EXCLUDED.raw_num_transactions, \
                 median_spend_per_transaction = EXCLUDED.median_spend_per_transaction, \
                 raw_total_spend = EXCLUDED.raw_total_spend",
        )
        .bind(&record.placekey)
        .bind(&record.safegraph_brand_ids)
        .bind(&record.brands)
        .bind(record.date_range_start)
        .bind(record.date_range_end)
        .bind(record.closed_on)
        .bind(record.raw_num_transactions)
        .bind(record.median_spend_per_transaction)
        .bind(record.raw_total_spend)
        .execute(&mut *tx)
        .await?;
        summary.spend += 1;
    }

    tx.commit().await?;
    tracing::info!(
        places = summary.places,
        patterns = summary.patterns,
        spend = summary.spend,
        "seeded warehouse fixture"
    );
    Ok(summary)
}
