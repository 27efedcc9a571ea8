use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;
use spendcov_core::{coverage::format_percent, CoverageResult};

use crate::middleware::RequestId;

use super::{map_db_error, require_brand, ApiError, ApiResponse, AppState, BrandQuery, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct CoverageItem {
    pub brand_filter: String,
    pub core_count: i64,
    pub patterns_count: i64,
    pub spend_count: i64,
    /// `null` when no core place matches.
    pub spend_ratio: Option<f64>,
    pub patterns_ratio: Option<f64>,
    pub spend_percent: String,
    pub patterns_percent: String,
    pub summary: Vec<String>,
}

impl From<CoverageResult> for CoverageItem {
    fn from(result: CoverageResult) -> Self {
        let spend_ratio = result.spend_ratio();
        let patterns_ratio = result.patterns_ratio();
        Self {
            summary: result.summary_lines(),
            core_count: result.counts.core_count,
            patterns_count: result.counts.patterns_count,
            spend_count: result.counts.spend_count,
            spend_ratio,
            patterns_ratio,
            spend_percent: format_percent(spend_ratio),
            patterns_percent: format_percent(patterns_ratio),
            brand_filter: result.brand_filter,
        }
    }
}

pub(super) async fn get_coverage(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<ApiResponse<CoverageItem>>, ApiError> {
    let brand = require_brand(&req_id.0, query.brand)?;

    let result = state
        .warehouse
        .compute_coverage(&brand)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CoverageItem::from(result),
        meta: ResponseMeta::new(req_id.0),
    }))
}
