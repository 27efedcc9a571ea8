use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct BrandItem {
    pub name: String,
    pub brand_id: Option<String>,
    /// Value to send back as `brand` under the configured brand key; `null`
    /// when the entry cannot be selected under that key.
    pub filter_value: Option<String>,
}

pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<BrandItem>>>, ApiError> {
    let catalog = state
        .warehouse
        .list_brands()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let brand_key = state.warehouse.options().brand_key;
    let data = catalog
        .into_iter()
        .map(|entry| BrandItem {
            filter_value: entry.filter_value(brand_key).map(str::to_string),
            name: entry.name,
            brand_id: entry.brand_id,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
