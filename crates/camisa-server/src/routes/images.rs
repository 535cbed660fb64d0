//! Image serving and download handlers.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::media::MediaError;
use crate::server::AppState;

/// GET /api/getImage/{image}
///
/// Serves a file stored directly under the media root with its guessed
/// content type.
pub async fn get_image(
    State(state): State<AppState>,
    Path(image): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.media.resolve(&image)?;
    let bytes = tokio::fs::read(&path).await.map_err(MediaError::from)?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.as_ref().to_owned())], bytes).into_response())
}

/// GET /download/{image}
///
/// Finds the file anywhere under the media root and serves it as an
/// attachment.
pub async fn download(
    State(state): State<AppState>,
    Path(image): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.media.find(&image)?;
    let bytes = tokio::fs::read(&path).await.map_err(MediaError::from)?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok((
        [
            (header::CONTENT_TYPE, mime.as_ref().to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{image}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
