//! Catalog listing and search.

use axum::extract::{Query, State};
use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::{flash, pages};

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub search: Option<String>,
}

/// GET /
pub async fn index(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Query(query): Query<HomeQuery>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let limit = ctx.config.catalog.page_size;
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    let images = match search {
        Some(q) => pixly_db::queries::images::search_images(&conn, q, limit)?,
        None => pixly_db::queries::images::list_images(&conn, 0, limit)?,
    };

    let (jar, flashes) = flash::take(jar);
    Ok((jar, Html(pages::catalog::home(&images, search, &flashes))))
}
