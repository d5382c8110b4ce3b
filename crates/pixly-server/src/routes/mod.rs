//! Route handlers, grouped by page family.

pub mod edits;
pub mod health;
pub mod home;
pub mod images;
pub mod media;
pub mod metadata;

use axum::http::Uri;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use pixly_core::{Error, ImageId, MetadataId};
use pixly_db::models::Image;
use rusqlite::Connection;

use crate::flash::{self, Flash};

/// Parse a path id; malformed ids are reported as missing records.
pub(crate) fn parse_image_id(raw: &str) -> pixly_core::Result<ImageId> {
    raw.trim()
        .parse()
        .map_err(|_| Error::not_found("image", raw))
}

pub(crate) fn parse_metadata_id(raw: &str) -> pixly_core::Result<MetadataId> {
    raw.trim()
        .parse()
        .map_err(|_| Error::not_found("metadata", raw))
}

/// Look up an image or fail with `NotFound`.
pub(crate) fn require_image(conn: &Connection, id: ImageId) -> pixly_core::Result<Image> {
    pixly_db::queries::images::get_image(conn, id)?.ok_or_else(|| Error::not_found("image", id))
}

/// Run CPU-bound image work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> pixly_core::Result<T>
where
    F: FnOnce() -> pixly_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
}

/// Catch-all for unmatched routes.
pub async fn fallback(uri: Uri, jar: CookieJar) -> Response {
    tracing::debug!("No route for {uri}");
    flash::redirect(jar, "/", Flash::error("Invalid URL route"))
}
