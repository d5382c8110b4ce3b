//! Key/value annotations attached to images.

use pixly_core::{Error, ImageId, MetadataId, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::models::ImageMetadata;

const COLS: &str = "id, image_id, name, value";

/// Attach a new annotation to an image.
///
/// Fails with a database error if `image_id` does not reference an image.
pub fn create_metadata(
    conn: &Connection,
    image_id: ImageId,
    name: &str,
    value: &str,
) -> Result<ImageMetadata> {
    let id = MetadataId::new();

    conn.execute(
        "INSERT INTO image_metadata (id, image_id, name, value) VALUES (?1,?2,?3,?4)",
        rusqlite::params![id.to_string(), image_id.to_string(), name, value],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(ImageMetadata {
        id,
        image_id,
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// List the annotations for an image, ordered by name.
pub fn list_metadata_for_image(
    conn: &Connection,
    image_id: ImageId,
) -> Result<Vec<ImageMetadata>> {
    let q = format!("SELECT {COLS} FROM image_metadata WHERE image_id = ?1 ORDER BY name, rowid");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([image_id.to_string()], ImageMetadata::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Get a single annotation by ID.
pub fn get_metadata(conn: &Connection, id: MetadataId) -> Result<Option<ImageMetadata>> {
    let q = format!("SELECT {COLS} FROM image_metadata WHERE id = ?1");
    conn.query_row(&q, [id.to_string()], ImageMetadata::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// Set the value of the first annotation called `name`, creating it if the
/// image has none.
pub fn upsert_metadata(
    conn: &Connection,
    image_id: ImageId,
    name: &str,
    value: &str,
) -> Result<ImageMetadata> {
    let q = format!(
        "SELECT {COLS} FROM image_metadata WHERE image_id = ?1 AND name = ?2 ORDER BY rowid LIMIT 1"
    );
    let existing = conn
        .query_row(&q, [image_id.to_string(), name.to_string()], ImageMetadata::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    match existing {
        Some(mut meta) => {
            conn.execute(
                "UPDATE image_metadata SET value = ?1 WHERE id = ?2",
                rusqlite::params![value, meta.id.to_string()],
            )
            .map_err(|e| Error::database(e.to_string()))?;
            meta.value = value.to_string();
            Ok(meta)
        }
        None => create_metadata(conn, image_id, name, value),
    }
}

/// Delete an annotation by ID.
pub fn delete_metadata(conn: &Connection, id: MetadataId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM image_metadata WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete every annotation, returning how many were removed.
pub fn delete_all_metadata(conn: &Connection) -> Result<u64> {
    let n = conn
        .execute("DELETE FROM image_metadata", [])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n as u64)
}
