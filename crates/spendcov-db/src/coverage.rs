//! Coverage counts: core registry vs. patterns and spend, for one brand filter.

use sqlx::PgPool;
use spendcov_core::{CoverageCounts, CoverageOptions};

use crate::DbError;

pub(crate) const COVERAGE_SQL: &str = concat!(
    "WITH core AS ( \
         SELECT c.placekey \
         FROM core_places c \
         WHERE ",
    core_scope_predicate!(),
    " ), \
     pat AS ( \
         SELECT DISTINCT placekey \
         FROM patterns \
         WHERE date_range_start >= $1 AND date_range_start < $2 \
     ), \
     sp AS ( \
         SELECT DISTINCT placekey \
         FROM spend \
         WHERE date_range_start >= $1 AND date_range_start < $2 \
     ) \
     SELECT \
         COUNT(core.placekey) AS core_count, \
         COUNT(pat.placekey)  AS patterns_count, \
         COUNT(sp.placekey)   AS spend_count \
     FROM core \
     LEFT JOIN pat ON pat.placekey = core.placekey \
     LEFT JOIN sp  ON sp.placekey  = core.placekey"
);

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
struct CoverageCountsRow {
    core_count: i64,
    patterns_count: i64,
    spend_count: i64,
}

impl From<CoverageCountsRow> for CoverageCounts {
    fn from(row: CoverageCountsRow) -> Self {
        Self {
            core_count: row.core_count,
            patterns_count: row.patterns_count,
            spend_count: row.spend_count,
        }
    }
}

/// Count core places matching `brand_filter` and how many of them appear in
/// the patterns and spend datasets during the reporting window.
///
/// Patterns and spend are reduced to distinct placekeys before the left join,
/// so neither count can exceed the core count. A filter containing NUL can
/// match no stored text and yields zero counts without a round-trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_coverage(
    pool: &PgPool,
    options: &CoverageOptions,
    brand_filter: &str,
) -> Result<CoverageCounts, DbError> {
    if brand_filter.contains('\0') {
        return Ok(CoverageCounts::default());
    }

    let row = sqlx::query_as::<_, CoverageCountsRow>(COVERAGE_SQL)
        .bind(options.window.start)
        .bind(options.window.end)
        .bind(options.closure_filter.includes_closed())
        .bind(brand_filter)
        .bind(options.brand_key.as_str())
        .fetch_one(pool)
        .await?;

    Ok(row.into())
}
