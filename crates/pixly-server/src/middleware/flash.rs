//! Merges flashes raised by error responses into the request's cookie.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::flash::{self, DeferredFlash};

/// Turn a [`DeferredFlash`] response extension into a `pixly_flash` cookie
/// that keeps the messages already pending in the request.
pub async fn flash_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<DeferredFlash>() {
        Some(DeferredFlash(message)) => (flash::push(jar, message), response).into_response(),
        None => response,
    }
}
