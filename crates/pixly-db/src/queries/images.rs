//! Image CRUD, listing and search.

use chrono::{SecondsFormat, Utc};
use pixly_core::{Error, ImageId, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::models::Image;

const COLS: &str =
    "id, image_name, uploaded_by, notes, filename, storage_url, created_at, updated_at";

/// Same columns qualified with the `i` alias, for joins.
const COLS_I: &str = "i.id, i.image_name, i.uploaded_by, i.notes, i.filename, i.storage_url, \
                      i.created_at, i.updated_at";

/// Fields supplied by the uploader; ids and timestamps are assigned here.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub image_name: String,
    pub uploaded_by: String,
    pub notes: String,
    pub filename: String,
    pub storage_url: String,
}

pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Create a new image record with a fresh id.
pub fn create_image(conn: &Connection, new: &NewImage) -> Result<Image> {
    create_image_with_id(conn, ImageId::new(), new)
}

/// Create an image record under a caller-chosen id.
///
/// Uploads pick the id first so the object-store key can include it.
pub fn create_image_with_id(conn: &Connection, id: ImageId, new: &NewImage) -> Result<Image> {
    let ts = now();

    conn.execute(
        "INSERT INTO images (id, image_name, uploaded_by, notes, filename, storage_url, created_at, updated_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?7)",
        rusqlite::params![
            id.to_string(),
            new.image_name,
            new.uploaded_by,
            new.notes,
            new.filename,
            new.storage_url,
            ts,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Image {
        id,
        image_name: new.image_name.clone(),
        uploaded_by: new.uploaded_by.clone(),
        notes: new.notes.clone(),
        filename: new.filename.clone(),
        storage_url: new.storage_url.clone(),
        created_at: ts.clone(),
        updated_at: ts,
    })
}

/// Get an image by ID.
pub fn get_image(conn: &Connection, id: ImageId) -> Result<Option<Image>> {
    let q = format!("SELECT {COLS} FROM images WHERE id = ?1");
    conn.query_row(&q, [id.to_string()], Image::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// List images, newest first.
pub fn list_images(conn: &Connection, offset: i64, limit: i64) -> Result<Vec<Image>> {
    let q = format!(
        "SELECT {COLS} FROM images ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(rusqlite::params![limit, offset], Image::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Case-insensitive substring search over name, notes, uploader, filename
/// and metadata values. An empty query matches every image.
pub fn search_images(conn: &Connection, query: &str, limit: i64) -> Result<Vec<Image>> {
    let pattern = format!("%{}%", escape_like(query.trim()));
    let q = format!(
        r"SELECT {COLS_I} FROM images i
          WHERE i.image_name LIKE ?1 ESCAPE '\'
             OR i.notes LIKE ?1 ESCAPE '\'
             OR i.uploaded_by LIKE ?1 ESCAPE '\'
             OR i.filename LIKE ?1 ESCAPE '\'
             OR EXISTS (
                 SELECT 1 FROM image_metadata m
                 WHERE m.image_id = i.id AND m.value LIKE ?1 ESCAPE '\'
             )
          ORDER BY i.created_at DESC, i.rowid DESC
          LIMIT ?2"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(rusqlite::params![pattern, limit], Image::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Total number of images.
pub fn count_images(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

/// Point an image at newly stored bytes after an edit.
pub fn update_storage(
    conn: &Connection,
    id: ImageId,
    storage_url: &str,
    filename: &str,
) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE images SET storage_url = ?1, filename = ?2, updated_at = ?3 WHERE id = ?4",
            rusqlite::params![storage_url, filename, now(), id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete an image by ID. Its metadata rows cascade.
pub fn delete_image(conn: &Connection, id: ImageId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM images WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete every image, returning how many were removed.
pub fn delete_all_images(conn: &Connection) -> Result<u64> {
    let n = conn
        .execute("DELETE FROM images", [])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n as u64)
}
