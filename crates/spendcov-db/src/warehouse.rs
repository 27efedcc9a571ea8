//! The data source the presenters talk to: a pool, the fixed query options,
//! and one result cache per query kind.

use std::sync::Arc;

use sqlx::PgPool;
use spendcov_core::{BrandCatalog, CoverageOptions, CoverageResult};

use crate::cache::{QueryCache, QueryKind, QuerySignature};
use crate::spend_rows::SpendRow;
use crate::DbError;

#[derive(Debug)]
pub struct Warehouse {
    pool: PgPool,
    options: CoverageOptions,
    brands: QueryCache<BrandCatalog>,
    coverage: QueryCache<CoverageResult>,
    spend_rows: QueryCache<Arc<Vec<SpendRow>>>,
}

impl Warehouse {
    #[must_use]
    pub fn new(pool: PgPool, options: CoverageOptions) -> Self {
        Self {
            pool,
            brands: QueryCache::new(options.cache_ttl),
            coverage: QueryCache::new(options.cache_ttl),
            spend_rows: QueryCache::new(options.cache_ttl),
            options,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[must_use]
    pub fn options(&self) -> &CoverageOptions {
        &self.options
    }

    /// Brands available for selection in the reporting window.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the warehouse query fails.
    pub async fn list_brands(&self) -> Result<BrandCatalog, DbError> {
        self.brands
            .get_or_try_insert_with(QuerySignature::brand_catalog(), || {
                crate::list_brands(&self.pool, &self.options.window)
            })
            .await
    }

    /// Counts and coverage ratios for `brand_filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the warehouse query fails.
    pub async fn compute_coverage(&self, brand_filter: &str) -> Result<CoverageResult, DbError> {
        self.coverage
            .get_or_try_insert_with(
                QuerySignature::filtered(QueryKind::Coverage, brand_filter),
                || async {
                    let counts =
                        crate::count_coverage(&self.pool, &self.options, brand_filter).await?;
                    Ok(CoverageResult::new(brand_filter, counts))
                },
            )
            .await
    }

    /// Spend rows for `brand_filter`, one per matching place.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the warehouse query fails.
    pub async fn fetch_spend_rows(&self, brand_filter: &str) -> Result<Arc<Vec<SpendRow>>, DbError> {
        self.spend_rows
            .get_or_try_insert_with(
                QuerySignature::filtered(QueryKind::SpendRows, brand_filter),
                || async {
                    let rows =
                        crate::list_spend_rows(&self.pool, &self.options, brand_filter).await?;
                    Ok(Arc::new(rows))
                },
            )
            .await
    }
}
