use futures::future::join_all;
use tracing::{info, warn};

use crate::error::PipelineResult;
use crate::stage;
use crate::store::ObjectStore;
use crate::{ObjectRef, DEFAULT_CHUNK_COUNT};

/// Runs split -> map -> reduce in-process against one store.
///
/// Mirrors what the remote driver does over HTTP: every chunk of every
/// source is mapped concurrently, a chunk whose map fails is logged and left
/// out of the reduce, and a split or reduce failure fails the run.
pub struct Pipeline<'a> {
    store: &'a dyn ObjectStore,
    chunk_count: usize,
    output_bucket: Option<String>,
}

#[derive(Debug)]
pub struct RunReport {
    pub chunks: Vec<ObjectRef>,
    pub tables: Vec<ObjectRef>,
    /// Chunks whose map failed, with the error message.
    pub skipped: Vec<(ObjectRef, String)>,
    pub output: ObjectRef,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self {
            store,
            chunk_count: DEFAULT_CHUNK_COUNT,
            output_bucket: None,
        }
    }

    pub fn with_chunk_count(mut self, chunk_count: usize) -> Self {
        self.chunk_count = chunk_count;
        self
    }

    pub fn with_output_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.output_bucket = Some(bucket.into());
        self
    }

    pub async fn run<S: AsRef<str>>(&self, sources: &[S]) -> PipelineResult<RunReport> {
        let mut chunks = Vec::new();
        for source in sources {
            chunks.extend(stage::split(self.store, source.as_ref(), self.chunk_count).await?);
        }
        info!("split {} sources into {} chunks", sources.len(), chunks.len());

        let uris: Vec<String> = chunks.iter().map(ObjectRef::to_string).collect();
        let results = join_all(uris.iter().map(|uri| stage::map_chunk(self.store, uri))).await;

        let mut tables = Vec::with_capacity(chunks.len());
        let mut skipped = Vec::new();
        for (chunk, result) in chunks.iter().zip(results) {
            match result {
                Ok(table) => tables.push(table),
                Err(e) => {
                    warn!("skipping {chunk}: {e}");
                    skipped.push((chunk.clone(), e.to_string()));
                }
            }
        }

        let table_uris: Vec<String> = tables.iter().map(ObjectRef::to_string).collect();
        // fall back to the sources' bucket so an all-skipped run still lands somewhere
        let bucket = self
            .output_bucket
            .as_deref()
            .or_else(|| chunks.first().map(ObjectRef::bucket));
        let output = stage::reduce(self.store, &table_uris, bucket).await?;

        Ok(RunReport {
            chunks,
            tables,
            skipped,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::workload::wc;
    use crate::WordCounts;

    fn output_table(store: &MemoryStore, output: &ObjectRef) -> WordCounts {
        serde_json::from_slice(&store.peek(output.bucket(), output.key()).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn round_trip_matches_direct_count() {
        // 24 bytes, every 8-byte chunk ends on a space
        let text = "red fox big dog red dog ";
        assert_eq!(text.len() % 3, 0);
        let store = MemoryStore::new();
        store.insert("words", "input.txt", text);

        let report = Pipeline::new(&store)
            .run(&["s3://words/input.txt"])
            .await
            .unwrap();
        assert_eq!(report.chunks.len(), 3);
        assert_eq!(report.tables.len(), 3);
        assert!(report.skipped.is_empty());
        assert_eq!(
            output_table(&store, &report.output),
            wc::count_words(text.as_bytes())
        );
    }

    #[tokio::test]
    async fn boundary_token_is_counted_as_two_words() {
        // "abcdef" splits into "ab", "cd", "ef"
        let store = MemoryStore::new();
        store.insert("words", "joined.txt", "abcdef");
        let report = Pipeline::new(&store)
            .run(&["s3://words/joined.txt"])
            .await
            .unwrap();
        let counts = output_table(&store, &report.output);
        assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["ab", "cd", "ef"]);
    }

    #[tokio::test]
    async fn empty_source_gives_empty_final_table() {
        let store = MemoryStore::new();
        store.insert("words", "empty.txt", "");
        let report = Pipeline::new(&store)
            .run(&["s3://words/empty.txt"])
            .await
            .unwrap();
        assert_eq!(report.tables.len(), 3);
        assert!(output_table(&store, &report.output).is_empty());
    }

    #[tokio::test]
    async fn merges_several_sources() {
        let store = MemoryStore::new();
        store.insert("words", "a.txt", "one two ");
        store.insert("words", "b.txt", "two six ");
        let report = Pipeline::new(&store)
            .with_chunk_count(2)
            .with_output_bucket("results")
            .run(&["s3://words/a.txt", "s3://words/b.txt"])
            .await
            .unwrap();
        assert_eq!(report.chunks.len(), 4);
        assert_eq!(report.output.bucket(), "results");
        let counts = output_table(&store, &report.output);
        assert_eq!(counts["two"], 2);
        assert_eq!(counts["one"], 1);
        assert_eq!(counts["six"], 1);
    }

    #[tokio::test]
    async fn failed_split_fails_the_run() {
        let store = MemoryStore::new();
        let err = Pipeline::new(&store)
            .run(&["s3://words/absent.txt"])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "store_fetch");
    }
}
