//! Object storage for uploaded image bytes.
//!
//! The web layer only ever sees URLs: [`ObjectStore::put`] hands one back
//! and records keep it in `storage_url`. URLs under the store's public base
//! map back to keys; anything else (e.g. an external bucket URL) is
//! downloaded over HTTP when the bytes are needed for an edit.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use pixly_core::config::{StorageBackend, StorageConfig};
use pixly_core::{Error, ImageId, Result};

/// Bytes plus the content type they were stored with.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// A URL-returning blob store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` and return the public URL for it.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String>;

    /// Fetch an object by key, `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Remove an object, returning whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Prefix of every URL this store hands out.
    fn public_base_url(&self) -> &str;

    fn url_for_key(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url().trim_end_matches('/'), key)
    }

    /// Map a URL handed out by this store back to its key.
    fn key_for_url(&self, url: &str) -> Option<String> {
        let base = self.public_base_url().trim_end_matches('/');
        url.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| validate_key(key).is_ok())
            .map(String::from)
    }
}

/// Build the store selected in configuration.
pub fn build_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Local => Arc::new(LocalObjectStore::new(
            config.root.clone(),
            config.public_base_url.clone(),
        )),
        StorageBackend::Memory => Arc::new(MemoryObjectStore::new(config.public_base_url.clone())),
    }
}

/// Reject keys that could escape the store root.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains('\\') {
        return Err(Error::validation(format!("invalid object key '{key}'")));
    }
    let path = Path::new(key);
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(Error::validation(format!("invalid object key '{key}'")));
    }
    Ok(())
}

/// Reduce a user-supplied filename to a safe key segment.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Key for the original upload of an image.
pub fn upload_key(image_id: ImageId, filename: &str) -> String {
    format!("{image_id}/{}", sanitize_filename(filename))
}

/// Content type inferred from a key or path extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// HTTP client for downloading external image URLs.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client with timeout: {e}");
            reqwest::Client::new()
        })
}

/// Load the bytes behind a `storage_url`.
///
/// URLs owned by `store` are read directly; `http(s)` URLs are downloaded
/// with `http`.
pub async fn fetch_bytes(
    store: &dyn ObjectStore,
    http: &reqwest::Client,
    url: &str,
) -> Result<Bytes> {
    if let Some(key) = store.key_for_url(url) {
        return store
            .get(&key)
            .await?
            .map(|obj| obj.data)
            .ok_or_else(|| Error::Storage(format!("object missing for {url}")));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        tracing::debug!("Downloading image bytes from {url}");
        let data = http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to download {url}: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Storage(format!("HTTP error downloading {url}: {e}")))?
            .bytes()
            .await
            .map_err(|e| Error::Storage(format!("Failed to read bytes from {url}: {e}")))?;
        return Ok(data);
    }

    Err(Error::Storage(format!("cannot resolve storage url '{url}'")))
}

// ---------------------------------------------------------------------------
// LocalObjectStore
// ---------------------------------------------------------------------------

/// Filesystem-backed store rooted at a directory.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url,
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        tracing::debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(self.url_for_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(StoredObject {
                data: Bytes::from(data),
                content_type: content_type_for(key).to_string(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}

// ---------------------------------------------------------------------------
// MemoryObjectStore
// ---------------------------------------------------------------------------

/// In-process store; contents vanish with the process.
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
    public_base_url: String,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String> {
        validate_key(key)?;
        self.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.url_for_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        validate_key(key)?;
        Ok(self.objects.get(key).map(|obj| obj.value().clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.objects.remove(key).is_some())
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\my cat.JPG"), "my_cat.JPG");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "image");
    }

    #[test]
    fn validate_key_rejects_traversal() {
        assert!(validate_key("a/b.jpg").is_ok());
        assert!(validate_key("../b.jpg").is_err());
        assert!(validate_key("/abs.jpg").is_err());
        assert!(validate_key("a\\b.jpg").is_err());
        assert!(validate_key("").is_err());
    }

    #[test]
    fn key_for_url_round_trips() {
        let store = MemoryObjectStore::new("/media");
        let url = store.url_for_key("abc/photo.jpg");
        assert_eq!(url, "/media/abc/photo.jpg");
        assert_eq!(store.key_for_url(&url).as_deref(), Some("abc/photo.jpg"));
        assert_eq!(
            store.key_for_url("https://pixlybucket.s3.us-west-1.amazonaws.com/sampleone.JPG"),
            None
        );
        assert_eq!(store.key_for_url("/mediafoo/x.jpg"), None);
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for("a/b.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a/b.png"), "image/png");
        assert_eq!(content_type_for("a/b"), "application/octet-stream");
    }

    #[tokio::test]
    async fn memory_store_put_get_delete() {
        let store = MemoryObjectStore::new("/media");
        let url = store
            .put("k/one.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert_eq!(url, "/media/k/one.png");

        let obj = store.get("k/one.png").await.unwrap().unwrap();
        assert_eq!(&obj.data[..], b"png");
        assert_eq!(obj.content_type, "image/png");

        assert!(store.delete("k/one.png").await.unwrap());
        assert!(!store.delete("k/one.png").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn local_store_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf(), "/media".into());

        let url = store
            .put("img/a.jpg", Bytes::from_static(b"\xFF\xD8\xFF"), "image/jpeg")
            .await
            .unwrap();
        assert!(dir.path().join("img/a.jpg").exists());

        let http = http_client(Duration::from_secs(5));
        let bytes = fetch_bytes(&store, &http, &url).await.unwrap();
        assert_eq!(&bytes[..], b"\xFF\xD8\xFF");

        assert!(store.get("img/missing.jpg").await.unwrap().is_none());
        assert!(store.delete("img/a.jpg").await.unwrap());
        assert!(store.put("../escape.jpg", Bytes::new(), "image/jpeg").await.is_err());
    }

    #[tokio::test]
    async fn fetch_unresolvable_url_is_storage_error() {
        let store = MemoryObjectStore::new("/media");
        let http = http_client(Duration::from_secs(5));
        let err = fetch_bytes(&store, &http, "ftp://elsewhere/x.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        let err = fetch_bytes(&store, &http, "/media/absent.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn stalled_download_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let store = MemoryObjectStore::new("/media");
        let http = http_client(Duration::from_millis(200));
        let url = format!("http://{addr}/slow.jpg");
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            fetch_bytes(&store, &http, &url),
        )
        .await
        .expect("download should give up before the outer deadline");
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
