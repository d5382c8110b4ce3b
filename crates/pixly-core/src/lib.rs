//! pixly-core: shared types, IDs, errors and configuration.
//!
//! This crate is the foundational dependency for the other pixly crates,
//! providing type-safe identifiers, a unified error type, application
//! configuration, and the vocabulary of image edits (tone, border, size)
//! that travels between the edit, preview and upload pages.

pub mod config;
pub mod edit;
pub mod error;
pub mod ids;

pub use edit::{Border, EditParams, ImageSize, Tone};
pub use error::{Error, Result};
pub use ids::*;
