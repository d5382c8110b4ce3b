//! HTTP middleware.

pub mod flash;
pub mod request_id;
