//! Upload, detail and delete handlers.

use axum::extract::{Multipart, Path, State};
use axum::response::{Html, Response};
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;
use pixly_core::{Error, ImageId};
use pixly_db::queries::images::NewImage;

use super::{blocking, parse_image_id, require_image};
use crate::context::AppContext;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::{editor, pages, storage};

/// GET /addimage
pub async fn add_image_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, flashes) = flash::take(jar);
    (jar, Html(pages::catalog::add_image(&flashes)))
}

/// Fields collected from the upload form.
#[derive(Debug, Default)]
struct UploadForm {
    image_name: String,
    uploaded_by: String,
    notes: String,
    filename: Option<String>,
    data: Option<Bytes>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> pixly_core::Result<Self> {
        let bad_upload = |e: axum::extract::multipart::MultipartError| {
            Error::validation(format!("Could not read upload: {}", e.body_text()))
        };

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image_name" => form.image_name = field.text().await.map_err(bad_upload)?,
                "uploaded_by" => form.uploaded_by = field.text().await.map_err(bad_upload)?,
                "notes" => form.notes = field.text().await.map_err(bad_upload)?,
                "file" => {
                    form.filename = field.file_name().map(String::from);
                    form.data = Some(field.bytes().await.map_err(bad_upload)?);
                }
                other => tracing::debug!("Ignoring unexpected upload field '{other}'"),
            }
        }
        Ok(form)
    }
}

/// POST /addimage
pub async fn add_image(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;

    let image_name = form.image_name.trim().to_string();
    if image_name.is_empty() {
        return Err(Error::validation("Image name is required").into());
    }
    let data = form
        .data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| Error::validation("An image file is required"))?;

    let described = data.clone();
    let description = blocking(move || editor::describe(&described)).await?;

    let id = ImageId::new();
    let filename = storage::sanitize_filename(form.filename.as_deref().unwrap_or(""));
    let key = storage::upload_key(id, &filename);
    let storage_url = ctx.store.put(&key, data, &description.mime_type).await?;

    let new = NewImage {
        image_name,
        uploaded_by: form.uploaded_by.trim().to_string(),
        notes: form.notes.trim().to_string(),
        filename,
        storage_url,
    };

    if let Err(e) = insert_with_metadata(&ctx, id, &new, &description) {
        if let Err(cleanup) = ctx.store.delete(&key).await {
            tracing::warn!("Failed to remove orphaned object {key}: {cleanup}");
        }
        return Err(e.into());
    }

    tracing::info!(
        "Uploaded image {id} '{}' ({}, {})",
        new.image_name,
        description.resolution(),
        description.format
    );
    Ok(flash::redirect(
        jar,
        &format!("/image/{id}"),
        Flash::success("Image uploaded"),
    ))
}

fn insert_with_metadata(
    ctx: &AppContext,
    id: ImageId,
    new: &NewImage,
    description: &editor::ImageDescription,
) -> pixly_core::Result<()> {
    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    pixly_db::queries::images::create_image_with_id(&tx, id, new)?;
    for (name, value) in description.metadata_rows() {
        pixly_db::queries::image_metadata::create_metadata(&tx, id, name, &value)?;
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))
}

/// GET /image/{id}
pub async fn show_image(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let id = parse_image_id(&id)?;
    let conn = pixly_db::pool::get_conn(&ctx.db)?;
    let image = require_image(&conn, id)?;
    let metadata = pixly_db::queries::image_metadata::list_metadata_for_image(&conn, id)?;

    let (jar, flashes) = flash::take(jar);
    Ok((jar, Html(pages::catalog::detail(&image, &metadata, &flashes))))
}

/// POST /image/{id}/delete
pub async fn delete_image(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_image_id(&id)?;
    let image = {
        let conn = pixly_db::pool::get_conn(&ctx.db)?;
        let image = require_image(&conn, id)?;
        pixly_db::queries::images::delete_image(&conn, id)?;
        image
    };

    if let Some(key) = ctx.store.key_for_url(&image.storage_url) {
        if let Err(e) = ctx.store.delete(&key).await {
            tracing::warn!("Failed to remove stored object {key}: {e}");
        }
    }

    tracing::info!("Deleted image {id} '{}'", image.image_name);
    Ok(flash::redirect(jar, "/", Flash::success("Image deleted")))
}
