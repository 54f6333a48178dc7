//! Content-addressed blob storage for mandates.
//!
//! Parties publish the signed JSON and hand each other a content id; anyone
//! holding the id can fetch the exact bytes and re-verify them.
//!
//! # Key Schema
//!
//! ```text
//! {prefix}/blobs/{sha256 hex}.json
//! ```
//!
//! Content ids are `sha256:` + lowercase hex of the stored bytes. The same id
//! always names the same bytes, so writes are create-only and a repeated put
//! is a no-op.

pub mod error;
pub mod object_store_backend;

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::debug;

pub use error::{StoreError, StoreResult};
pub use object_store_backend::ObjectStoreBlobStore;

use crate::error::MandateResult;
use crate::mandate::Mandate;

const CONTENT_ID_PREFIX: &str = "sha256:";

/// Parsed store specification from CLI/config.
///
/// # Examples
///
/// ```text
/// file:///var/lib/mandates
/// memory://  (for testing)
/// ```
#[derive(Debug, Clone)]
pub struct StoreSpec {
    /// The scheme (file, memory)
    pub scheme: String,
    /// Host component, if any
    pub host: Option<String>,
    /// Base path
    pub prefix: String,
}

impl StoreSpec {
    /// Parse a store URL like `file:///path`.
    pub fn parse(url: &str) -> StoreResult<Self> {
        let parsed = url::Url::parse(url).map_err(|e| StoreError::InvalidSpec {
            spec: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host: parsed.host_str().map(|s| s.to_string()),
            prefix: parsed.path().trim_start_matches('/').to_string(),
        })
    }

    pub fn is_memory(&self) -> bool {
        self.scheme == "memory"
    }

    pub fn is_file(&self) -> bool {
        self.scheme == "file"
    }
}

/// Content id of `bytes`: `sha256:<hex>`.
pub fn content_id(bytes: &[u8]) -> String {
    format!("{CONTENT_ID_PREFIX}{}", hex::encode(Sha256::digest(bytes)))
}

/// The hex digest inside a content id.
pub(crate) fn content_digest(content_id: &str) -> StoreResult<&str> {
    content_id
        .strip_prefix(CONTENT_ID_PREFIX)
        .filter(|hex| hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| StoreError::InvalidContentId {
            content_id: content_id.to_string(),
        })
}

/// Content-addressed blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return their content id. Idempotent.
    async fn put(&self, bytes: Bytes) -> StoreResult<String>;

    /// Fetch the bytes for a content id, checking they still hash to it.
    async fn get(&self, content_id: &str) -> StoreResult<Bytes>;

    async fn exists(&self, content_id: &str) -> StoreResult<bool>;
}

/// Publish a mandate's JSON and return its content id.
pub async fn publish_mandate<S>(store: &S, mandate: &Mandate) -> MandateResult<String>
where
    S: BlobStore + ?Sized,
{
    let bytes = mandate.to_vec()?;
    let id = store.put(Bytes::from(bytes)).await?;
    debug!(mandate_id = %mandate.mandate_id(), content_id = %id, "mandate published");
    Ok(id)
}

/// Fetch and re-hydrate a mandate by content id.
pub async fn fetch_mandate<S>(store: &S, content_id: &str) -> MandateResult<Mandate>
where
    S: BlobStore + ?Sized,
{
    let bytes = store.get(content_id).await?;
    Mandate::from_slice(&bytes)
}
