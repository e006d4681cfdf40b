use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, VoteDto};

#[derive(Debug, Deserialize)]
pub struct VoteParams {
    pub vote: i64,
    pub imdbid: String,
}

pub async fn cast_vote(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VoteParams>,
) -> Result<Json<ApiResponse<VoteDto>>, ApiError> {
    let row = state.votes().cast(&params.imdbid, params.vote).await?;

    Ok(Json(ApiResponse::success(VoteDto::from(row))))
}
