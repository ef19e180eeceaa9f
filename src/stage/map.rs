use tracing::info;

use crate::error::PipelineResult;
use crate::store::{self, ObjectStore};
use crate::workload::wc;
use crate::ObjectRef;

/// Count the words in the chunk at `chunk` and store the table next to it.
///
/// The table goes to the chunk's derived `mapped/..._mapped.json` key in the
/// same bucket. Mapping the same chunk twice rewrites the same table.
pub async fn map_chunk(store: &dyn ObjectStore, chunk: &str) -> PipelineResult<ObjectRef> {
    let chunk: ObjectRef = chunk.parse()?;
    let content = store::fetch(store, &chunk).await?;

    let counts = wc::count_words(&content);
    let table = chunk.mapped();
    info!("mapped {chunk}: {} distinct words -> {table}", counts.len());

    store::persist(store, &table, wc::encode(&counts)).await?;
    Ok(table)
}
