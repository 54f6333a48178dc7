//! Object store implementation of BlobStore.
//!
//! Supports local filesystem and in-memory backends via the `object_store` crate.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::path::Path;
use object_store::{ObjectStore, ObjectStoreExt, PutMode, PutOptions, PutPayload};

use super::{content_digest, content_id, BlobStore, StoreError, StoreResult, StoreSpec};

/// Blob store backed by `object_store`.
pub struct ObjectStoreBlobStore {
    inner: Arc<dyn ObjectStore>,
    prefix: String,
}

impl ObjectStoreBlobStore {
    /// Create a store from a parsed spec.
    pub fn from_spec(spec: &StoreSpec) -> StoreResult<Self> {
        let inner: Arc<dyn ObjectStore> = match spec.scheme.as_str() {
            "memory" => Arc::new(object_store::memory::InMemory::new()),
            "file" => {
                let path = match &spec.host {
                    Some(host) => format!("/{}/{}", host, spec.prefix),
                    None => format!("/{}", spec.prefix),
                };
                // Ensure directory exists
                std::fs::create_dir_all(&path).map_err(|e| StoreError::Io {
                    message: format!("failed to create store directory {}: {}", path, e),
                })?;
                Arc::new(
                    object_store::local::LocalFileSystem::new_with_prefix(&path).map_err(|e| {
                        StoreError::Io {
                            message: format!("failed to create local store at {}: {}", path, e),
                        }
                    })?,
                )
            }
            scheme => {
                return Err(StoreError::InvalidSpec {
                    spec: spec.scheme.clone(),
                    reason: format!("unsupported scheme: {}", scheme),
                })
            }
        };

        // Local stores are already rooted at the prefix
        let prefix = if spec.is_file() {
            String::new()
        } else {
            spec.prefix.trim_matches('/').to_string()
        };
        Ok(Self { inner, prefix })
    }

    /// Create a store from a URL string.
    pub fn from_url(url: &str) -> StoreResult<Self> {
        let spec = StoreSpec::parse(url)?;
        Self::from_spec(&spec)
    }

    /// Create an in-memory store for testing.
    pub fn memory() -> Self {
        Self {
            inner: Arc::new(object_store::memory::InMemory::new()),
            prefix: String::new(),
        }
    }

    fn key(&self, digest: &str) -> Path {
        let digest = digest.to_ascii_lowercase();
        if self.prefix.is_empty() {
            Path::from(format!("blobs/{digest}.json"))
        } else {
            Path::from(format!("{}/blobs/{digest}.json", self.prefix))
        }
    }
}

#[async_trait]
impl BlobStore for ObjectStoreBlobStore {
    async fn put(&self, bytes: Bytes) -> StoreResult<String> {
        let id = content_id(&bytes);
        let key = self.key(content_digest(&id)?);
        let opts = PutOptions {
            mode: PutMode::Create, // Fails if object exists
            ..Default::default()
        };

        match self
            .inner
            .put_opts(&key, PutPayload::from_bytes(bytes), opts)
            .await
        {
            Ok(_) => {
                tracing::debug!(content_id = %id, "blob stored");
                Ok(id)
            }
            // Same id, same bytes
            Err(object_store::Error::AlreadyExists { .. }) => Ok(id),
            Err(e) => Err(StoreError::from_object_store(e, &id)),
        }
    }

    async fn get(&self, content_id_str: &str) -> StoreResult<Bytes> {
        let key = self.key(content_digest(content_id_str)?);

        let result = self
            .inner
            .get(&key)
            .await
            .map_err(|e| StoreError::from_object_store(e, content_id_str))?;
        let bytes = result.bytes().await.map_err(|e| StoreError::Io {
            message: format!("failed to read blob bytes: {}", e),
        })?;

        let actual = content_id(&bytes);
        if !actual.eq_ignore_ascii_case(content_id_str) {
            return Err(StoreError::Corrupt {
                content_id: content_id_str.to_string(),
                actual,
            });
        }
        Ok(bytes)
    }

    async fn exists(&self, content_id_str: &str) -> StoreResult<bool> {
        let key = self.key(content_digest(content_id_str)?);
        match self.inner.head(&key).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StoreError::Io {
                message: format!("failed to check blob existence: {}", e),
            }),
        }
    }
}
