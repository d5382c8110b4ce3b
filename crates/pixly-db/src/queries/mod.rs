//! Database query modules.
//!
//! - images: Image CRUD, listing and search
//! - image_metadata: Key/value annotations attached to images

pub mod image_metadata;
pub mod images;
