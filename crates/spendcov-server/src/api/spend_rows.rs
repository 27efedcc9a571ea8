use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use spendcov_db::SpendRow;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, require_brand, ApiError, ApiResponse, AppState, BrandQuery,
    ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct SpendRowItem {
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

impl From<&SpendRow> for SpendRowItem {
    fn from(row: &SpendRow) -> Self {
        Self {
            placekey: row.placekey.clone(),
            safegraph_brand_ids: row.safegraph_brand_ids.clone(),
            brands: row.brands.clone(),
            date_range_start: row.date_range_start,
            date_range_end: row.date_range_end,
            closed_on: row.closed_on,
            raw_num_transactions: row.raw_num_transactions,
            median_spend_per_transaction: row.median_spend_per_transaction,
            raw_total_spend: row.raw_total_spend,
        }
    }
}

/// `total` is the full match count (equal to the coverage spend count);
/// `rows` holds at most `limit` of them.
#[derive(Debug, Serialize)]
pub(super) struct SpendRowsPage {
    pub total: usize,
    pub rows: Vec<SpendRowItem>,
}

pub(super) async fn list_spend_rows(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<ApiResponse<SpendRowsPage>>, ApiError> {
    let brand = require_brand(&req_id.0, query.brand)?;
    let limit = usize::try_from(normalize_limit(query.limit)).unwrap_or(1);

    let rows = state
        .warehouse
        .fetch_spend_rows(&brand)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = SpendRowsPage {
        total: rows.len(),
        rows: rows.iter().take(limit).map(SpendRowItem::from).collect(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
