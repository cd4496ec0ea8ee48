use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::db::alert_repo;
use crate::models::Alert;
use crate::AppState;

#[derive(Deserialize)]
pub struct RecentParams {
    pub limit: Option<i64>,
}

/// Alert feed, newest first.
pub async fn recent(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Json<ApiResponse<Vec<Alert>>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);

    match alert_repo::get_recent(&state.db, limit).await {
        Ok(alerts) => Json(ApiResponse::ok(alerts)),
        Err(e) => Json(ApiResponse::err(e.to_string())),
    }
}
