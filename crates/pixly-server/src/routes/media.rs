//! Serves objects out of the configured store.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::context::AppContext;
use crate::error::AppError;
use crate::storage;

/// GET {storage.public_base_url}/{*key}, `/media` by default
pub async fn serve_media(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    if storage::validate_key(&key).is_err() {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    match ctx.store.get(&key).await? {
        Some(obj) => Ok((
            [
                (header::CONTENT_TYPE, obj.content_type),
                (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
            ],
            obj.data,
        )
            .into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}
