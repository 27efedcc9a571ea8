use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;
use spendcov_core::{Histogram, HISTOGRAM_BINS};

use crate::middleware::RequestId;

use super::{map_db_error, require_brand, ApiError, ApiResponse, AppState, BrandQuery, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct HistogramsItem {
    pub brand_filter: String,
    pub bin_count: usize,
    pub transactions: Histogram,
    pub median_spend: Histogram,
}

pub(super) async fn get_histograms(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<ApiResponse<HistogramsItem>>, ApiError> {
    let brand = require_brand(&req_id.0, query.brand)?;

    let rows = state
        .warehouse
        .fetch_spend_rows(&brand)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = HistogramsItem {
        transactions: spendcov_db::transactions_histogram(&rows),
        median_spend: spendcov_db::median_spend_histogram(&rows),
        bin_count: HISTOGRAM_BINS,
        brand_filter: brand,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
