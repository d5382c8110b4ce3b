//! pixly-db: database access and persistence layer.
//!
//! SQLite-backed storage with r2d2 connection pooling, embedded
//! migrations, typed models, and query modules for images and their
//! metadata annotations.
//!
//! # Example
//!
//! ```
//! use pixly_db::pool::{init_memory_pool, get_conn};
//! use pixly_db::queries::images::{self, NewImage};
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let image = images::create_image(&conn, &NewImage {
//!     image_name: "harbor".into(),
//!     uploaded_by: "sam".into(),
//!     notes: "".into(),
//!     filename: "harbor.jpg".into(),
//!     storage_url: "/media/harbor.jpg".into(),
//! }).unwrap();
//! assert!(images::get_image(&conn, image.id).unwrap().is_some());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
