//! The edit flow: tone/border form, preview, render and upload.

use std::path::Path as FsPath;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;
use pixly_core::{EditParams, Error, ImageId};
use serde::Deserialize;

use super::{blocking, parse_image_id, require_image};
use crate::context::AppContext;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::{editor, pages, storage};

/// Edit values as they arrive from forms and query strings.
#[derive(Debug, Default, Deserialize)]
pub struct EditQuery {
    pub image_id: Option<String>,
    pub tone: Option<String>,
    pub border: Option<String>,
    pub size: Option<String>,
}

impl EditQuery {
    fn params(&self) -> pixly_core::Result<EditParams> {
        EditParams::parse(
            self.tone.as_deref(),
            self.border.as_deref(),
            self.size.as_deref(),
        )
    }

    fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// GET /image/{id}/edit
pub async fn edit_form(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<EditQuery>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let id = parse_image_id(&id)?;
    let params = query.params()?;
    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    let image = require_image(&conn, id)?;

    let (jar, flashes) = flash::take(jar);
    Ok((jar, Html(pages::edit::edit_form(&image, &params, &flashes))))
}

/// POST /image/{id}/edit
pub async fn submit_edit(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Form(form): Form<EditQuery>,
) -> Result<Redirect, AppError> {
    let id = parse_image_id(&id)?;
    let params = form.params()?;
    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    require_image(&conn, id)?;

    Ok(Redirect::to(&format!(
        "/image/{id}/edit/preview?tone={}&border={}",
        params.tone, params.border
    )))
}

/// GET /image/{id}/edit/preview
pub async fn preview(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<EditQuery>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let id = parse_image_id(&id)?;
    let params = query.params()?;
    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    let image = require_image(&conn, id)?;

    let (jar, flashes) = flash::take(jar);
    Ok((jar, Html(pages::edit::preview(&image, &params, &flashes))))
}

/// GET /image/{id}/render
///
/// The stored image with the query's edit applied, as JPEG.
pub async fn render(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(query): Query<EditQuery>,
) -> Result<Response, AppError> {
    let id = parse_image_id(&id)?;
    let params = query.params()?;
    let image = {
        let conn = pixly_db::pool::get_conn(&ctx.db)?;
        require_image(&conn, id)?
    };

    let data = storage::fetch_bytes(ctx.store.as_ref(), &ctx.http, &image.storage_url).await?;
    let jpeg = blocking(move || editor::render_jpeg(&data, &params)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        jpeg,
    )
        .into_response())
}

/// GET /uploadedit
pub async fn upload_edit_page(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Query(query): Query<EditQuery>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let staged = match query.image_id() {
        Some(raw) => {
            let id = parse_image_id(raw)?;
            let params = query.params()?;
            let conn = pixly_db::pool::get_conn(&ctx.db)?;
            Some((require_image(&conn, id)?, params))
        }
        None => None,
    };

    let (jar, flashes) = flash::take(jar);
    let page = pages::edit::upload_edit(
        staged.as_ref().map(|(image, params)| (image, params)),
        &flashes,
    );
    Ok((jar, Html(page)))
}

/// POST /uploadedit
///
/// Applies the staged edit to the current bytes and replaces the stored
/// object.
pub async fn upload_edit(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Form(form): Form<EditQuery>,
) -> Result<Response, AppError> {
    let raw_id = form
        .image_id()
        .ok_or_else(|| Error::validation("No edit is staged for upload"))?;
    let id = parse_image_id(raw_id)?;
    let params = form.params()?;
    let image = {
        let conn = pixly_db::pool::get_conn(&ctx.db)?;
        require_image(&conn, id)?
    };

    let data = storage::fetch_bytes(ctx.store.as_ref(), &ctx.http, &image.storage_url).await?;
    let (jpeg, width, height) = blocking(move || {
        let edited = editor::apply(editor::decode(&data)?, &params);
        let jpeg = editor::encode_jpeg(&edited)?;
        Ok((jpeg, edited.width(), edited.height()))
    })
    .await?;

    let filename = edited_filename(&image.filename);
    let key = format!(
        "{id}/{}-{filename}",
        chrono::Utc::now().format("%Y%m%d%H%M%S%3f")
    );
    let storage_url = ctx.store.put(&key, Bytes::from(jpeg), "image/jpeg").await?;

    let resolution = format!("{width}x{height}");
    if let Err(e) = record_edit(&ctx, id, &storage_url, &filename, &resolution, &params) {
        if let Err(cleanup) = ctx.store.delete(&key).await {
            tracing::warn!("Failed to remove edited object {key} after a failed update: {cleanup}");
        }
        return Err(e.into());
    }

    if let Some(old_key) = ctx.store.key_for_url(&image.storage_url) {
        if let Err(e) = ctx.store.delete(&old_key).await {
            tracing::warn!("Failed to remove replaced object {old_key}: {e}");
        }
    }

    tracing::info!("Updated image {id} with {} ({width}x{height})", params.to_query());
    Ok(flash::redirect(
        jar,
        &format!("/image/{id}"),
        Flash::success("Image updated"),
    ))
}

/// Point the image at its edited object and refresh the edit metadata in one
/// transaction.
fn record_edit(
    ctx: &AppContext,
    id: ImageId,
    storage_url: &str,
    filename: &str,
    resolution: &str,
    params: &EditParams,
) -> pixly_core::Result<()> {
    use pixly_db::queries::image_metadata::upsert_metadata;

    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    pixly_db::queries::images::update_storage(&tx, id, storage_url, filename)?;
    upsert_metadata(&tx, id, "resolution", resolution)?;
    upsert_metadata(&tx, id, "tone", params.tone.as_str())?;
    upsert_metadata(&tx, id, "border", params.border.as_str())?;
    tx.commit().map_err(|e| Error::database(e.to_string()))
}

/// `photo.png` becomes `photo-edited.jpg`; repeated edits keep one suffix.
fn edited_filename(original: &str) -> String {
    let stem = FsPath::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let stem = stem.strip_suffix("-edited").unwrap_or(stem);
    storage::sanitize_filename(&format!("{stem}-edited.jpg"))
}
