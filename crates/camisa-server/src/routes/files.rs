//! Media root listing.

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::server::AppState;

/// GET /files
///
/// Returns the media root as a JSON tree: a flat directory is an array of
/// file names, a directory with subdirectories is an object.
pub async fn tree(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(state.media.tree()?))
}
