use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::db::position_repo;
use crate::models::Position;
use crate::AppState;

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// Open positions, most recently opened first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<ApiResponse<Vec<Position>>> {
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);

    match position_repo::get_open_positions(&state.db, limit).await {
        Ok(positions) => Json(ApiResponse::ok(positions)),
        Err(e) => Json(ApiResponse::err(e.to_string())),
    }
}
