//! Recipe search endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::debug;

use recipebook_search::SearchQuery;
use recipebook_store::Recipe;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Query string of `GET /search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// JSON-encoded [`SearchQuery`].
    pub query: Option<String>,
}

/// GET /search?query=<json>
///
/// The query is compiled before any storage access; a query without groups
/// returns an empty list.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Recipe>>> {
    let raw = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("missing 'query' parameter".to_string()))?;

    let query: SearchQuery = serde_json::from_str(&raw)
        .map_err(|e| ServerError::BadRequest(format!("malformed search query: {e}")))?;

    let predicate = state.compiler.compile(&query)?;
    debug!(%predicate, "Running recipe search");

    Ok(Json(state.db.search_recipes(&predicate)?))
}
