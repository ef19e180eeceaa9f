//! Word counting and table merging.
//!

use crate::error::{PipelineError, PipelineResult};
use crate::utils;
use crate::{ObjectRef, WordCounts};
use bytes::Bytes;
use fnv::FnvHashMap;
use serde_json::{Map, Value};

/// Characters trimmed from both ends of every token.
pub const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\''];

/// Counts the words in a chunk of raw text.
///
/// The text is lowercased and split on whitespace; each token loses any
/// leading or trailing [`PUNCTUATION`], and tokens left empty are dropped.
/// Punctuation inside a token (`don't`, `e.g`) is kept.
pub fn count_words(content: &[u8]) -> WordCounts {
    let text = utils::decode_text(content).to_lowercase();

    let mut counts: FnvHashMap<&str, u64> = FnvHashMap::default();
    for word in text
        .split_whitespace()
        .map(|token| token.trim_matches(PUNCTUATION))
        .filter(|word| !word.is_empty())
    {
        *counts.entry(word).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(word, count)| (word.to_string(), count))
        .collect()
}

/// Adds every count in `table`, fetched from `source`, into `merged`.
///
/// A sum that no longer fits a `u64` is reported as a parse error against
/// `source`; `merged` may already hold some of that table's words by then.
pub fn merge_into(
    merged: &mut WordCounts,
    table: WordCounts,
    source: &ObjectRef,
) -> PipelineResult<()> {
    for (word, count) in table {
        let total = merged.entry(word).or_insert(0);
        *total = total.checked_add(count).ok_or_else(|| PipelineError::Parse {
            uri: source.to_string(),
            message: "count overflow".to_string(),
        })?;
    }
    Ok(())
}

/// Serializes a table as a flat JSON object, keys in sorted order.
pub fn encode(table: &WordCounts) -> Bytes {
    let object: Map<String, Value> = table
        .iter()
        .map(|(word, count)| (word.clone(), Value::from(*count)))
        .collect();
    Bytes::from(Value::Object(object).to_string())
}

/// Parses a table fetched from `source`.
pub fn decode(source: &ObjectRef, body: &[u8]) -> PipelineResult<WordCounts> {
    serde_json::from_slice(body).map_err(|e| PipelineError::Parse {
        uri: source.to_string(),
        message: e.to_string(),
    })
}
