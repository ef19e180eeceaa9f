use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::objref;
use crate::store::{self, ObjectStore};
use crate::workload::wc;
use crate::{ObjectRef, WordCounts};

/// Sum the tables behind `tables` into the final word count table.
///
/// All references are parsed before anything is fetched, so one malformed
/// reference rejects the whole call without store I/O. Any table that can't
/// be fetched or parsed fails the call as well; nothing is skipped.
///
/// The result is written to [`objref::FINAL_KEY`] in `output_bucket`, or in
/// the bucket of the first table when no output bucket is given. An empty
/// list is a valid run and yields an empty table.
pub async fn reduce<S: AsRef<str>>(
    store: &dyn ObjectStore,
    tables: &[S],
    output_bucket: Option<&str>,
) -> PipelineResult<ObjectRef> {
    let tables = objref::parse_all(tables)?;
    let bucket = output_bucket
        .or_else(|| tables.first().map(ObjectRef::bucket))
        .ok_or_else(|| {
            PipelineError::bad_request("no table references and no output bucket to write to")
        })?;
    let output = ObjectRef::final_in(bucket)?;

    let mut merged = WordCounts::new();
    for table in &tables {
        let body = store::fetch(store, table).await?;
        wc::merge_into(&mut merged, wc::decode(table, &body)?, table)?;
    }
    info!(
        "reduced {} tables into {} distinct words -> {output}",
        tables.len(),
        merged.len()
    );

    store::persist(store, &output, wc::encode(&merged)).await?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn final_table(store: &MemoryStore, output: &ObjectRef) -> WordCounts {
        serde_json::from_slice(&store.peek(output.bucket(), output.key()).unwrap()).unwrap()
    }

    fn table(pairs: &[(&str, u64)]) -> WordCounts {
        pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }

    #[tokio::test]
    async fn sums_counts_across_tables() {
        let store = MemoryStore::new();
        store.insert("words", "mapped/t0.json", r#"{"a":1,"b":2}"#);
        store.insert("words", "mapped/t1.json", r#"{"a":3,"c":1}"#);

        let output = reduce(
            &store,
            &["s3://words/mapped/t0.json", "s3://words/mapped/t1.json"],
            None,
        )
        .await
        .unwrap();
        assert_eq!(output.to_string(), "s3://words/final/word_count_final.json");
        assert_eq!(
            final_table(&store, &output),
            table(&[("a", 4), ("b", 2), ("c", 1)])
        );
    }

    #[tokio::test]
    async fn single_table_comes_back_unchanged() {
        let store = MemoryStore::new();
        store.insert("words", "mapped/only.json", r#"{"x":7,"y":1}"#);
        let output = reduce(&store, &["s3://words/mapped/only.json"], None)
            .await
            .unwrap();
        assert_eq!(final_table(&store, &output), table(&[("x", 7), ("y", 1)]));
    }

    #[tokio::test]
    async fn empty_list_is_a_zero_result_run() {
        let store = MemoryStore::new();
        let output = reduce::<&str>(&store, &[], Some("results")).await.unwrap();
        assert_eq!(output.to_string(), "s3://results/final/word_count_final.json");
        assert!(final_table(&store, &output).is_empty());
        assert_eq!(store.gets(), 0);
    }

    #[tokio::test]
    async fn empty_list_without_bucket_is_rejected() {
        let store = MemoryStore::new();
        let err = reduce::<&str>(&store, &[], None).await.unwrap_err();
        assert!(err.is_bad_request());
        assert_eq!(store.puts(), 0);
    }

    #[tokio::test]
    async fn output_bucket_overrides_table_bucket() {
        let store = MemoryStore::new();
        store.insert("words", "mapped/t.json", r#"{"a":1}"#);
        let output = reduce(&store, &["s3://words/mapped/t.json"], Some("results"))
            .await
            .unwrap();
        assert_eq!(output.bucket(), "results");
    }

    #[tokio::test]
    async fn three_empty_tables_give_empty_result() {
        let store = MemoryStore::new();
        let refs: Vec<String> = (0..3)
            .map(|i| {
                let key = format!("mapped/e_chunk_{i}_mapped.json");
                store.insert("words", &key, "{}");
                format!("s3://words/{key}")
            })
            .collect();
        let output = reduce(&store, &refs, None).await.unwrap();
        assert!(final_table(&store, &output).is_empty());
    }

    #[tokio::test]
    async fn malformed_reference_fails_before_any_fetch() {
        let store = MemoryStore::new();
        store.insert("words", "mapped/t0.json", r#"{"a":1}"#);
        let err = reduce(&store, &["s3://words/mapped/t0.json", "words-no-scheme"], None)
            .await
            .unwrap_err();
        assert!(err.is_bad_request());
        assert_eq!((store.gets(), store.puts()), (0, 0));
    }

    #[tokio::test]
    async fn unfetchable_table_aborts() {
        let store = MemoryStore::new();
        store.insert("words", "mapped/t0.json", r#"{"a":1}"#);
        let err = reduce(
            &store,
            &["s3://words/mapped/t0.json", "s3://words/mapped/missing.json"],
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "store_fetch");
        assert!(!store.contains("words", objref::FINAL_KEY));
    }

    #[tokio::test]
    async fn unparseable_table_aborts() {
        let store = MemoryStore::new();
        store.insert("words", "mapped/bad.json", "not a table");
        let err = reduce(&store, &["s3://words/mapped/bad.json"], None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "parse");
        assert_eq!(store.puts(), 0);
    }

    #[tokio::test]
    async fn count_overflow_is_a_parse_error_naming_the_table() {
        let store = MemoryStore::new();
        store.insert("words", "mapped/t0.json", r#"{"a":18446744073709551615}"#);
        store.insert("words", "mapped/t1.json", r#"{"a":1}"#);
        let err = reduce(
            &store,
            &["s3://words/mapped/t0.json", "s3://words/mapped/t1.json"],
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "parse");
        assert!(err.to_string().contains("s3://words/mapped/t1.json"), "{err}");
        assert_eq!(store.puts(), 0);
    }

    #[tokio::test]
    async fn failed_final_write_is_a_write_error() {
        let store = MemoryStore::new();
        store.insert("words", "mapped/t.json", r#"{"a":1}"#);
        store.fail_puts_after(0);
        let err = reduce(&store, &["s3://words/mapped/t.json"], None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "store_write");
    }
}
