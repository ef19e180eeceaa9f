use std::ops::Range;

use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::store::{self, ObjectStore};
use crate::{ObjectRef, MAX_CHUNK_COUNT};

/// Byte ranges of `chunk_count` contiguous chunks covering `len` bytes.
///
/// Every chunk but the last is `len / chunk_count` bytes long; the last one
/// takes the remainder too. Offsets ignore word, line and character
/// boundaries, so a token can end up cut in two.
pub fn partition(len: usize, chunk_count: usize) -> Vec<Range<usize>> {
    if chunk_count == 0 {
        return Vec::new();
    }
    let size = len / chunk_count;
    (0..chunk_count)
        .map(|i| {
            let start = i * size;
            let end = if i + 1 == chunk_count { len } else { start + size };
            start..end
        })
        .collect()
}

/// Split the object at `source` into `chunk_count` chunk objects.
///
/// Returns the chunk references in partition order. Chunks are written one at
/// a time; if a write fails the call fails and the chunks already written are
/// left in the store. `chunk_count` must be in `1..=MAX_CHUNK_COUNT`.
pub async fn split(
    store: &dyn ObjectStore,
    source: &str,
    chunk_count: usize,
) -> PipelineResult<Vec<ObjectRef>> {
    if !(1..=MAX_CHUNK_COUNT).contains(&chunk_count) {
        return Err(PipelineError::bad_request(format!(
            "chunk count must be between 1 and {MAX_CHUNK_COUNT}, got {chunk_count}"
        )));
    }
    let source: ObjectRef = source.parse()?;
    let content = store::fetch(store, &source).await?;
    info!("splitting {source} ({} bytes) into {chunk_count} chunks", content.len());

    let mut chunks = Vec::new();
    for (index, range) in partition(content.len(), chunk_count).into_iter().enumerate() {
        let chunk = source.chunk(index);
        store::persist(store, &chunk, content.slice(range)).await?;
        chunks.push(chunk);
    }
    Ok(chunks)
}
