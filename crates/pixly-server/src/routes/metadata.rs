//! Adding and removing image annotations.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use pixly_core::Error;
use serde::Deserialize;

use super::{parse_image_id, parse_metadata_id, require_image};
use crate::context::AppContext;
use crate::error::AppError;
use crate::flash::{self, Flash};

#[derive(Debug, Deserialize)]
pub struct MetadataForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// POST /image/{id}/metadata
pub async fn add_metadata(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<MetadataForm>,
) -> Result<Response, AppError> {
    let id = parse_image_id(&id)?;
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Metadata name is required").into());
    }

    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    require_image(&conn, id)?;
    let meta =
        pixly_db::queries::image_metadata::create_metadata(&conn, id, name, form.value.trim())?;

    tracing::debug!("Added metadata {} '{}' to image {id}", meta.id, meta.name);
    Ok(flash::redirect(
        jar,
        &format!("/image/{id}"),
        Flash::success("Metadata added"),
    ))
}

/// POST /image/{id}/metadata/{metadata_id}/delete
pub async fn delete_metadata(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path((id, metadata_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let id = parse_image_id(&id)?;
    let metadata_id = parse_metadata_id(&metadata_id)?;

    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    let meta = pixly_db::queries::image_metadata::get_metadata(&conn, metadata_id)?
        .filter(|m| m.image_id == id)
        .ok_or_else(|| Error::not_found("metadata", metadata_id))?;
    pixly_db::queries::image_metadata::delete_metadata(&conn, meta.id)?;

    Ok(flash::redirect(
        jar,
        &format!("/image/{id}"),
        Flash::success("Metadata removed"),
    ))
}
