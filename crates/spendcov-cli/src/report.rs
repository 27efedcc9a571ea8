//! Text presentation of the brand catalog, coverage summary, spend rows and
//! histograms.
//!
//! The `render_*` functions are pure so they can be tested without a
//! database; the `run_*` handlers fetch through the [`Warehouse`] and print.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendcov_core::{BrandCatalog, BrandKey, Histogram};
use spendcov_db::{SpendRow, Warehouse};

const BAR_WIDTH: usize = 40;

/// Which optional sections to print after the coverage summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CoverageView {
    pub rows: bool,
    pub transactions_histogram: bool,
    pub median_spend_histogram: bool,
}

impl CoverageView {
    fn needs_rows(self) -> bool {
        self.rows || self.transactions_histogram || self.median_spend_histogram
    }
}

/// Print the brand catalog, optionally truncated to `limit` entries.
///
/// # Errors
///
/// Returns an error if the warehouse query fails.
pub(crate) async fn run_brands(warehouse: &Warehouse, limit: Option<usize>) -> anyhow::Result<()> {
    let catalog = warehouse.list_brands().await?;
    if catalog.is_empty() {
        println!(
            "no brands with spend in {}; run `db seed` first",
            warehouse.options().window
        );
        return Ok(());
    }

    for line in render_brand_table(&catalog, warehouse.options().brand_key, limit) {
        println!("{line}");
    }
    Ok(())
}

/// Print the coverage summary for `brand_filter`, then whichever optional
/// sections `view` enables.
///
/// # Errors
///
/// Returns an error if either warehouse query fails.
pub(crate) async fn run_coverage(
    warehouse: &Warehouse,
    brand_filter: &str,
    view: CoverageView,
) -> anyhow::Result<()> {
    let result = warehouse.compute_coverage(brand_filter).await?;
    for line in result.summary_lines() {
        println!("{line}");
    }

    if !view.needs_rows() {
        return Ok(());
    }

    let rows = warehouse.fetch_spend_rows(brand_filter).await?;
    if view.rows {
        println!();
        for line in render_spend_rows(&rows) {
            println!("{line}");
        }
    }
    if view.transactions_histogram {
        println!();
        let histogram = spendcov_db::transactions_histogram(&rows);
        for line in render_histogram("Transactions per place", &histogram) {
            println!("{line}");
        }
    }
    if view.median_spend_histogram {
        println!();
        let histogram = spendcov_db::median_spend_histogram(&rows);
        for line in render_histogram("Median spend per transaction", &histogram) {
            println!("{line}");
        }
    }
    Ok(())
}

/// One header line plus one line per brand. The `FILTER` column is the value
/// to pass to `coverage --brand` under the configured brand key, or a dash
/// when the entry cannot be selected under that key.
pub(crate) fn render_brand_table(
    catalog: &BrandCatalog,
    brand_key: BrandKey,
    limit: Option<usize>,
) -> Vec<String> {
    let shown = limit.unwrap_or(catalog.len()).min(catalog.len());

    let mut lines = vec![format!("{:<40}{:<30}FILTER", "BRAND", "BRAND ID")];
    for entry in catalog.entries().iter().take(shown) {
        lines.push(format!(
            "{:<40}{:<30}{}",
            entry.name,
            entry.brand_id.as_deref().unwrap_or("\u{2014}"),
            entry.filter_value(brand_key).unwrap_or("\u{2014}"),
        ));
    }
    if shown < catalog.len() {
        lines.push(format!("... {} more", catalog.len() - shown));
    }
    lines
}

pub(crate) fn render_spend_rows(rows: &[SpendRow]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["no spend rows in the reporting window".to_string()];
    }

    let mut lines = vec![format!(
        "{:<24}{:<13}{:>14}{:>14}  BRAND",
        "PLACEKEY", "PERIOD", "TRANSACTIONS", "MEDIAN SPEND"
    )];
    for row in rows {
        lines.push(format!(
            "{:<24}{:<13}{:>14}{:>14}  {}",
            row.placekey,
            fmt_date(row.date_range_start),
            row.raw_num_transactions
                .map_or_else(|| "\u{2014}".to_string(), |n| n.to_string()),
            fmt_money(row.median_spend_per_transaction),
            row.brands.as_deref().unwrap_or("\u{2014}"),
        ));
    }
    lines
}

pub(crate) fn render_histogram(title: &str, histogram: &Histogram) -> Vec<String> {
    if histogram.is_empty() {
        return vec![format!("{title}: no data")];
    }

    let mut lines = vec![format!("{title} ({} places)", histogram.total())];
    lines.extend(histogram.render_bars(BAR_WIDTH));
    lines
}

fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn fmt_money(value: Option<Decimal>) -> String {
    value.map_or_else(
        || "\u{2014}".to_string(),
        |v| format!("${}", v.round_dp(2)),
    )
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
