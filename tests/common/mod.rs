//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires an in-memory database and an
//! in-memory object store into a full [`AppContext`] and drives the router
//! with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use pixly_core::config::Config;
use pixly_db::models::Image;
use pixly_db::pool::{init_memory_pool, DbPool};
use pixly_db::queries::{image_metadata, images};
use pixly_server::context::AppContext;
use pixly_server::router::build_router;
use pixly_server::storage::MemoryObjectStore;

pub const FIXTURE_URL: &str = "https://pixlybucket.s3.us-west-1.amazonaws.com/testfile.jpg";

const BOUNDARY: &str = "pixly-test-boundary";

/// Collected response: status, headers and the whole body.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Value this response sets for cookie `name`, including an empty removal.
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim_matches('"').to_string())
    }

    /// `name=value` pairs set by this response, skipping removals.
    fn cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter(|pair| pair.split_once('=').is_some_and(|(_, value)| !value.is_empty()))
            .map(String::from)
            .collect()
    }
}

/// Harness wrapping an [`AppContext`] with in-memory backends.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub store: Arc<MemoryObjectStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let store = Arc::new(MemoryObjectStore::new(config.storage.public_base_url.clone()));
        let ctx = AppContext::new(db.clone(), config, store.clone());
        Self { ctx, db, store }
    }

    pub fn router(&self) -> Router {
        build_router(self.ctx.clone())
    }

    /// Delete everything, then insert the single fixture image and its one
    /// metadata row.
    pub fn seed_fixture(&self) -> Image {
        let conn = self.db.get().unwrap();
        image_metadata::delete_all_metadata(&conn).unwrap();
        images::delete_all_images(&conn).unwrap();

        let image = images::create_image(
            &conn,
            &images::NewImage {
                image_name: "test".into(),
                uploaded_by: "test_user".into(),
                notes: "notes".into(),
                filename: "testfile.jpg".into(),
                storage_url: FIXTURE_URL.into(),
            },
        )
        .unwrap();
        image_metadata::create_metadata(&conn, image.id, "resolution", "high quality").unwrap();
        image
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST a multipart upload with text `fields` and an optional file part.
    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Follow 3xx responses with GETs, carrying cookies like a browser.
    pub async fn follow(&self, mut response: TestResponse) -> TestResponse {
        for _ in 0..5 {
            if !response.status.is_redirection() {
                return response;
            }
            let location = response.location().expect("redirect without location").to_string();
            let cookies = response.cookies().join("; ");

            let mut request = Request::builder().uri(location);
            if !cookies.is_empty() {
                request = request.header(header::COOKIE, cookies);
            }
            response = self.send(request.body(Body::empty()).unwrap()).await;
        }
        panic!("too many redirects");
    }

    pub async fn get_following_redirects(&self, uri: &str) -> TestResponse {
        let first = self.get(uri).await;
        self.follow(first).await
    }
}

/// Encode a solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 120, 40]),
    ));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}
