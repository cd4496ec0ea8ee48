use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::db::{position_repo, trader_repo};
use crate::errors::AppError;
use crate::models::{Position, TraderStat};
use crate::AppState;

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}

/// Traders ranked by realized profit. Traders below the settled-markets
/// minimum are excluded here, at read time only.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Json<ApiResponse<Vec<TraderStat>>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);

    match trader_repo::leaderboard(&state.db, state.config.min_settled_markets, limit).await {
        Ok(traders) => Json(ApiResponse::ok(traders)),
        Err(e) => Json(ApiResponse::err(e.to_string())),
    }
}

pub async fn detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<TraderStat>>, AppError> {
    let stat = trader_repo::get_by_address(&state.db, &address)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("trader {address} not found")))?;

    Ok(Json(ApiResponse::ok(stat)))
}

pub async fn positions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<ApiResponse<Vec<Position>>> {
    match position_repo::get_by_trader(&state.db, &address).await {
        Ok(positions) => Json(ApiResponse::ok(positions)),
        Err(e) => Json(ApiResponse::err(e.to_string())),
    }
}
