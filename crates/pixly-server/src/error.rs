//! Error-to-HTTP response conversion.
//!
//! Client errors never surface as raw 4xx pages: they send the browser back
//! to the catalog with a flash message. The message rides on the response as
//! a [`DeferredFlash`] so the flash middleware can queue it behind any
//! messages already pending. Server errors render an HTML error page and are
//! logged.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::flash::{DeferredFlash, Flash};
use crate::pages;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: pixly_core::Error,
}

impl AppError {
    pub fn new(inner: pixly_core::Error) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &pixly_core::Error {
        &self.inner
    }

    /// Message shown to the user for a client error.
    pub fn flash_message(&self) -> String {
        match &self.inner {
            pixly_core::Error::NotFound { entity, .. } => {
                let mut chars = entity.chars();
                let entity: String = match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => "Record".to_string(),
                };
                format!("{entity} not found")
            }
            pixly_core::Error::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<pixly_core::Error> for AppError {
    fn from(e: pixly_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.inner.is_client_error() {
            tracing::debug!(
                status = %status,
                error = %self.inner,
                "Redirecting after client error"
            );
            let mut response = Redirect::to("/").into_response();
            response
                .extensions_mut()
                .insert(DeferredFlash(Flash::error(self.flash_message())));
            return response;
        }

        tracing::error!(
            status = %status,
            error = %self.inner,
            "Server error in page handler"
        );

        let body = pages::error_page(status, &self.inner.to_string());
        (status, Html(body)).into_response()
    }
}
