//! Live integration tests for spendcov-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/spendcov-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use spendcov_core::{
    load_fixture, BrandKey, CacheTtl, ClosureFilter, CoverageCounts, CoverageOptions, FixtureFile,
    Place, SpendRecord,
};
use spendcov_db::{count_coverage, list_brands, list_spend_rows, seed_fixture, Warehouse};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sample_fixture() -> FixtureFile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample_warehouse.yaml");
    load_fixture(&path).unwrap_or_else(|e| panic!("failed to load {path:?}: {e}"))
}

async fn seed_sample(pool: &sqlx::PgPool) {
    seed_fixture(pool, &sample_fixture())
        .await
        .expect("seed_fixture failed");
}

fn options(closure_filter: ClosureFilter, brand_key: BrandKey) -> CoverageOptions {
    CoverageOptions {
        closure_filter,
        brand_key,
        ..CoverageOptions::default()
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn place(placekey: &str, brands: &str) -> Place {
    Place {
        placekey: placekey.to_string(),
        safegraph_brand_ids: None,
        brands: Some(brands.to_string()),
        location_name: brands.to_string(),
        top_category: None,
        city: None,
        region: None,
        opened_on: None,
        closed_on: None,
    }
}

fn spend(placekey: &str, brands: &str, start: &str) -> SpendRecord {
    SpendRecord {
        placekey: placekey.to_string(),
        safegraph_brand_ids: None,
        brands: Some(brands.to_string()),
        date_range_start: date(start),
        date_range_end: None,
        closed_on: None,
        raw_num_transactions: Some(25),
        median_spend_per_transaction: None,
        raw_total_spend: None,
    }
}

const FILTERS: [&str; 9] = [
    "McDonald's",
    "Chipotle",
    "Mc",
    "SG_BRAND",
    "",
    "   ",
    "Nonexistent Brand",
    "%",
    "'; DROP TABLE spend; --",
];

// ---------------------------------------------------------------------------
// Section 1: Coverage counts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn mcdonalds_coverage_excluding_closed(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    let counts = count_coverage(&pool, &CoverageOptions::default(), "McDonald's")
        .await
        .expect("count_coverage failed");

    assert_eq!(
        counts,
        CoverageCounts {
            core_count: 3,
            patterns_count: 3,
            spend_count: 2,
        }
    );
    assert!(counts.spend_count <= counts.core_count);
}

#[sqlx::test(migrations = "../../migrations")]
async fn mcdonalds_coverage_including_closed(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    let opts = options(ClosureFilter::IncludeAll, BrandKey::Name);
    let counts = count_coverage(&pool, &opts, "McDonald's")
        .await
        .expect("count_coverage failed");

    assert_eq!(counts.core_count, 4);
    assert_eq!(counts.patterns_count, 3);
    assert_eq!(counts.spend_count, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn substring_filter_matches_longer_brand_names(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    let counts = count_coverage(&pool, &CoverageOptions::default(), "Chipotle")
        .await
        .expect("count_coverage failed");

    assert_eq!(counts.core_count, 2);
    assert_eq!(counts.patterns_count, 1);
    assert_eq!(counts.spend_count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn filter_is_case_sensitive(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    let counts = count_coverage(&pool, &CoverageOptions::default(), "mcdonald's")
        .await
        .expect("count_coverage failed");

    assert_eq!(counts, CoverageCounts::default());
}

#[sqlx::test(migrations = "../../migrations")]
async fn brand_id_key_filters_on_registry_ids(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    let by_id = options(ClosureFilter::ExcludeClosed, BrandKey::Id);
    let counts = count_coverage(&pool, &by_id, "SG_BRAND_3b6e6d5b2c5f0a0c")
        .await
        .expect("count_coverage failed");
    assert_eq!(counts.core_count, 3);

    // The name is not an id, so nothing matches under the id key.
    let counts = count_coverage(&pool, &by_id, "McDonald's")
        .await
        .expect("count_coverage failed");
    assert_eq!(counts.core_count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn nonexistent_and_empty_filters_count_zero(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    for filter in ["", "   ", "Nonexistent Brand", "%", "_"] {
        let counts = count_coverage(&pool, &CoverageOptions::default(), filter)
            .await
            .expect("count_coverage failed");
        assert_eq!(counts, CoverageCounts::default(), "filter {filter:?}");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn filters_with_nul_match_nothing(pool: sqlx::PgPool) {
    seed_sample(&pool).await;
    let opts = CoverageOptions::default();

    for filter in ["Mc\0Donald's", "\0", "McDonald's\0"] {
        let counts = count_coverage(&pool, &opts, filter)
            .await
            .expect("count_coverage failed");
        assert_eq!(counts, CoverageCounts::default(), "filter {filter:?}");

        let rows = list_spend_rows(&pool, &opts, filter)
            .await
            .expect("list_spend_rows failed");
        assert!(rows.is_empty(), "filter {filter:?}");
    }

    let warehouse = Warehouse::new(pool, opts);
    let result = warehouse
        .compute_coverage("Mc\0Donald's")
        .await
        .expect("compute_coverage failed");
    assert_eq!(result.counts, CoverageCounts::default());
}

#[sqlx::test(migrations = "../../migrations")]
async fn core_places_without_spend_report_zero_spend(pool: sqlx::PgPool) {
    let fixture = FixtureFile {
        places: vec![place("arb-001@5vg", "Arby's"), place("arb-002@5vg", "Arby's")],
        ..FixtureFile::default()
    };
    seed_fixture(&pool, &fixture).await.expect("seed failed");

    let counts = count_coverage(&pool, &CoverageOptions::default(), "Arby's")
        .await
        .expect("count_coverage failed");

    assert_eq!(counts.core_count, 2);
    assert_eq!(counts.patterns_count, 0);
    assert_eq!(counts.spend_count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn spend_outside_window_is_not_counted(pool: sqlx::PgPool) {
    let fixture = FixtureFile {
        places: vec![place("wen-001@5vg", "Wendy's")],
        spend: vec![spend("wen-001@5vg", "Wendy's", "2021-04-01")],
        ..FixtureFile::default()
    };
    seed_fixture(&pool, &fixture).await.expect("seed failed");

    let counts = count_coverage(&pool, &CoverageOptions::default(), "Wendy's")
        .await
        .expect("count_coverage failed");
    assert_eq!(counts.core_count, 1);
    assert_eq!(counts.spend_count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn quote_in_filter_does_not_alter_query(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    let counts = count_coverage(&pool, &CoverageOptions::default(), "'; DROP TABLE spend; --")
        .await
        .expect("quote-bearing filter must not raise a syntax error");
    assert_eq!(counts, CoverageCounts::default());

    let spend_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM spend")
        .fetch_one(&pool)
        .await
        .expect("spend table must still exist");
    assert_eq!(spend_rows, 5);
}

// ---------------------------------------------------------------------------
// Section 2: Spend rows agree with coverage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn spend_row_count_matches_spend_count_for_every_filter(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    for closure_filter in [ClosureFilter::ExcludeClosed, ClosureFilter::IncludeAll] {
        for brand_key in [BrandKey::Name, BrandKey::Id] {
            let opts = options(closure_filter, brand_key);
            for filter in FILTERS {
                let counts = count_coverage(&pool, &opts, filter)
                    .await
                    .expect("count_coverage failed");
                let rows = list_spend_rows(&pool, &opts, filter)
                    .await
                    .expect("list_spend_rows failed");
                assert_eq!(
                    i64::try_from(rows.len()).expect("row count fits i64"),
                    counts.spend_count,
                    "filter {filter:?} with {closure_filter} / {brand_key}"
                );
                assert!(counts.spend_count <= counts.core_count);
                assert!(counts.patterns_count <= counts.core_count);
            }
        }
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn spend_rows_keep_latest_period_in_window(pool: sqlx::PgPool) {
    let fixture = FixtureFile {
        places: vec![place("tac-001@5vg", "Taco Bell")],
        spend: vec![
            spend("tac-001@5vg", "Taco Bell", "2021-03-01"),
            spend("tac-001@5vg", "Taco Bell", "2021-03-15"),
            spend("tac-001@5vg", "Taco Bell", "2021-04-01"),
        ],
        ..FixtureFile::default()
    };
    seed_fixture(&pool, &fixture).await.expect("seed failed");

    let opts = CoverageOptions::default();
    let rows = list_spend_rows(&pool, &opts, "Taco Bell")
        .await
        .expect("list_spend_rows failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date_range_start, date("2021-03-15"));

    let counts = count_coverage(&pool, &opts, "Taco Bell")
        .await
        .expect("count_coverage failed");
    assert_eq!(counts.spend_count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn spend_rows_carry_transaction_values(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    let rows = list_spend_rows(&pool, &CoverageOptions::default(), "McDonald's")
        .await
        .expect("list_spend_rows failed");

    let placekeys: Vec<&str> = rows.iter().map(|r| r.placekey.as_str()).collect();
    assert_eq!(placekeys, vec!["222-222@5vg-7gv-d7q", "223-222@5vg-7gv-d8z"]);
    assert_eq!(rows[0].raw_num_transactions, Some(1893));
    assert_eq!(
        rows[0].median_spend_per_transaction,
        Some(rust_decimal::Decimal::new(897, 2))
    );
}

// ---------------------------------------------------------------------------
// Section 3: Brand catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn brand_catalog_is_sorted_and_distinct(pool: sqlx::PgPool) {
    seed_sample(&pool).await;

    let catalog = list_brands(&pool, &CoverageOptions::default().window)
        .await
        .expect("list_brands failed");

    let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Chipotle Mexican Grill", "McDonald's"]);
    assert_eq!(
        catalog.entries()[1].brand_id.as_deref(),
        Some("SG_BRAND_3b6e6d5b2c5f0a0c")
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn brand_catalog_is_empty_without_spend(pool: sqlx::PgPool) {
    let catalog = list_brands(&pool, &CoverageOptions::default().window)
        .await
        .expect("list_brands failed");
    assert!(catalog.is_empty());
}

// ---------------------------------------------------------------------------
// Section 4: Seeding and the cached warehouse
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn seeding_twice_is_idempotent(pool: sqlx::PgPool) {
    let first = seed_fixture(&pool, &sample_fixture())
        .await
        .expect("first seed failed");
    let second = seed_fixture(&pool, &sample_fixture())
        .await
        .expect("second seed failed");
    assert_eq!(first, second);

    let places: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM core_places")
        .fetch_one(&pool)
        .await
        .expect("count places");
    assert_eq!(places, 7);
}

#[sqlx::test(migrations = "../../migrations")]
async fn warehouse_serves_cached_coverage_within_ttl(pool: sqlx::PgPool) {
    seed_sample(&pool).await;
    let warehouse = Warehouse::new(pool.clone(), CoverageOptions::default());

    let before = warehouse
        .compute_coverage("McDonald's")
        .await
        .expect("compute_coverage failed");
    assert_eq!(before.counts.spend_count, 2);

    let fixture = FixtureFile {
        places: sample_fixture().places,
        spend: vec![spend("224-222@5vg-7gv-fj9", "McDonald's", "2021-03-01")],
        ..FixtureFile::default()
    };
    seed_fixture(&pool, &fixture).await.expect("seed failed");

    let cached = warehouse
        .compute_coverage("McDonald's")
        .await
        .expect("compute_coverage failed");
    assert_eq!(cached, before, "result should come from the cache");

    let fresh_warehouse = Warehouse::new(pool.clone(), CoverageOptions::default());
    let fresh = fresh_warehouse
        .compute_coverage("McDonald's")
        .await
        .expect("compute_coverage failed");
    assert_eq!(fresh.counts.spend_count, 3);

    let rows = fresh_warehouse
        .fetch_spend_rows("McDonald's")
        .await
        .expect("fetch_spend_rows failed");
    assert_eq!(
        i64::try_from(rows.len()).expect("fits"),
        fresh.counts.spend_count
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn warehouse_with_zero_ttl_always_refetches(pool: sqlx::PgPool) {
    let opts = CoverageOptions {
        cache_ttl: CacheTtl::Expires(Duration::ZERO),
        ..CoverageOptions::default()
    };
    let warehouse = Warehouse::new(pool.clone(), opts);

    let empty = warehouse.list_brands().await.expect("list_brands failed");
    assert!(empty.is_empty());

    seed_sample(&pool).await;

    let populated = warehouse.list_brands().await.expect("list_brands failed");
    assert_eq!(populated.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn warehouse_reports_no_data_for_unknown_brand(pool: sqlx::PgPool) {
    seed_sample(&pool).await;
    let warehouse = Warehouse::new(pool, CoverageOptions::default());

    let result = warehouse
        .compute_coverage("Nonexistent Brand")
        .await
        .expect("compute_coverage failed");
    assert!(result.is_empty());
    assert_eq!(result.spend_ratio(), None);
    assert!(result.summary_lines()[0].contains("0% coverage"));
}
