//! The object store gateway every stage reads from and writes to.
//!
//! Stages only ever need two operations, `get` and `put`, addressed by
//! `(bucket, key)`. Each `put` is all-or-nothing for its own key; nothing is
//! transactional across keys.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::ObjectRef;

pub mod memory;
pub mod minio;

pub use memory::MemoryStore;
pub use minio::S3Store;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the whole object at `(bucket, key)`.
    async fn get(&self, bucket: &str, key: &str) -> anyhow::Result<Bytes>;

    /// Write `body` to `(bucket, key)`, replacing whatever was there.
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> anyhow::Result<()>;
}

/// Fetch the object behind `object`, reporting failures as store-fetch errors.
pub async fn fetch(store: &dyn ObjectStore, object: &ObjectRef) -> PipelineResult<Bytes> {
    debug!("fetching {object}");
    store
        .get(object.bucket(), object.key())
        .await
        .map_err(|source| PipelineError::StoreFetch {
            uri: object.to_string(),
            source,
        })
}

/// Store `body` at `object`, reporting failures as store-write errors.
pub async fn persist(
    store: &dyn ObjectStore,
    object: &ObjectRef,
    body: Bytes,
) -> PipelineResult<()> {
    debug!("storing {} bytes at {object}", body.len());
    store
        .put(object.bucket(), object.key(), body)
        .await
        .map_err(|source| PipelineError::StoreWrite {
            uri: object.to_string(),
            source,
        })
}
