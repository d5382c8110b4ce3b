//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use pixly_core::{ImageId, MetadataId};
use serde::Serialize;
use uuid::Uuid;

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// One uploaded photograph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: ImageId,
    pub image_name: String,
    pub uploaded_by: String,
    pub notes: String,
    pub filename: String,
    /// Resolvable location of the stored bytes.
    pub storage_url: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Image {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            image_name: row.get(1)?,
            uploaded_by: row.get(2)?,
            notes: row.get(3)?,
            filename: row.get(4)?,
            storage_url: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

// ---------------------------------------------------------------------------
// ImageMetadata
// ---------------------------------------------------------------------------

/// A key/value annotation attached to an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub id: MetadataId,
    pub image_id: ImageId,
    pub name: String,
    pub value: String,
}

impl ImageMetadata {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            image_id: parse_id(row, 1)?,
            name: row.get(2)?,
            value: row.get(3)?,
        })
    }
}
