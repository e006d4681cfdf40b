use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{ApiError, AppState};
use crate::models::query::MovieQuery;

/// Incoming parameters, named as the upstream names them.
#[derive(Debug, Deserialize)]
pub struct MovieParams {
    pub s: Option<String>,
    pub i: Option<String>,
    pub page: Option<u32>,
}

pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MovieParams>,
) -> Result<Json<Value>, ApiError> {
    let query = MovieQuery {
        imdb_id: params.i,
        page: params.page,
        search: params.s,
    };

    if query.is_empty() {
        return Err(ApiError::validation(
            "provide either s=<search term> or i=<imdb id>",
        ));
    }

    debug!("resolving movie query '{}'", query.canonical());

    let payload = state
        .enricher()
        .resolve(&query)
        .await
        .map_err(|e| ApiError::omdb_error(e.to_string()))?;

    // List responses are unwrapped to the enriched Search array; single-title
    // payloads and upstream error envelopes go out as-is.
    let body = match payload {
        Value::Object(mut obj) if obj.get("Search").is_some_and(Value::is_array) => {
            obj.remove("Search").unwrap_or_default()
        }
        other => other,
    };

    Ok(Json(body))
}
