//! Axum router construction.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::flash::flash_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Build the full application router.
pub fn build_router(ctx: AppContext) -> Router {
    let upload_limit = ctx.config.server.max_upload_bytes;
    let media_route = media_route(&ctx.config.storage.public_base_url);

    let catalog = Router::new()
        .route("/", get(routes::home::index))
        .route(
            "/addimage",
            get(routes::images::add_image_form).post(routes::images::add_image),
        )
        .route("/image/{id}", get(routes::images::show_image))
        .route("/image/{id}/delete", post(routes::images::delete_image))
        .route("/image/{id}/metadata", post(routes::metadata::add_metadata))
        .route(
            "/image/{id}/metadata/{metadata_id}/delete",
            post(routes::metadata::delete_metadata),
        );

    let edit_flow = Router::new()
        .route(
            "/image/{id}/edit",
            get(routes::edits::edit_form).post(routes::edits::submit_edit),
        )
        .route("/image/{id}/edit/preview", get(routes::edits::preview))
        .route("/image/{id}/render", get(routes::edits::render))
        .route(
            "/uploadedit",
            get(routes::edits::upload_edit_page).post(routes::edits::upload_edit),
        );

    Router::new()
        .merge(catalog)
        .merge(edit_flow)
        .route(&media_route, get(routes::media::serve_media))
        .route("/health", get(routes::health::health))
        .fallback(routes::fallback)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(middleware::from_fn(flash_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// First path segments already taken by page routes.
const RESERVED_SEGMENTS: &[&str] = &["addimage", "image", "uploadedit", "health"];

/// Route pattern serving stored objects under the store's public base path.
///
/// URL bases (an external CDN or bucket), the bare site root and bases that
/// collide with page routes fall back to `/media`.
fn media_route(public_base_url: &str) -> String {
    let base = public_base_url.trim_end_matches('/');
    let Some(path) = base.strip_prefix('/') else {
        return "/media/{*key}".to_string();
    };
    let first = path.split('/').next().unwrap_or("");
    if first.is_empty() || RESERVED_SEGMENTS.contains(&first) {
        tracing::warn!("Media cannot be served under '{public_base_url}'; using /media");
        return "/media/{*key}".to_string();
    }
    format!("{base}/{{*key}}")
}
