//! Object references and the key naming convention that ties a run together.
//!
//! A reference is written `s3://bucket/key`. The bucket is everything up to
//! the first `/` after the scheme; the key is the rest and may contain further
//! `/` characters, which are not interpreted.

use std::fmt;
use std::str::FromStr;

use crate::error::{PipelineError, PipelineResult};

pub const SCHEME: &str = "s3://";

/// Key the reducer writes its merged table to.
pub const FINAL_KEY: &str = "final/word_count_final.json";

const CHUNK_DIR: &str = "chunks/";
const MAPPED_DIR: &str = "mapped/";
const TEXT_SUFFIX: &str = ".txt";
const MAPPED_SUFFIX: &str = "_mapped.json";

/// A `(bucket, key)` handle to a stored object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    bucket: String,
    key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> PipelineResult<Self> {
        let bucket = bucket.into();
        let key = key.into();
        if bucket.is_empty() {
            return Err(PipelineError::bad_request("object reference has an empty bucket"));
        }
        if bucket.contains('/') {
            return Err(PipelineError::bad_request(format!(
                "bucket `{bucket}` must not contain `/`"
            )));
        }
        if key.is_empty() {
            return Err(PipelineError::bad_request(format!(
                "object reference into `{bucket}` has an empty key"
            )));
        }
        if key.contains(SCHEME) {
            return Err(PipelineError::bad_request(format!(
                "key `{key}` must not contain the `{SCHEME}` prefix"
            )));
        }
        Ok(Self { bucket, key })
    }

    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reference to the `index`th chunk split out of this source object.
    pub fn chunk(&self, index: usize) -> ObjectRef {
        ObjectRef {
            bucket: self.bucket.clone(),
            key: chunk_key(&self.key, index),
        }
    }

    /// Reference to the frequency table mapped from this chunk object.
    pub fn mapped(&self) -> ObjectRef {
        ObjectRef {
            bucket: self.bucket.clone(),
            key: mapped_key(&self.key),
        }
    }

    /// Reference to the final merged table in `bucket`.
    pub fn final_in(bucket: &str) -> PipelineResult<ObjectRef> {
        ObjectRef::new(bucket, FINAL_KEY)
    }
}

impl FromStr for ObjectRef {
    type Err = PipelineError;

    fn from_str(uri: &str) -> PipelineResult<Self> {
        let rest = uri.strip_prefix(SCHEME).ok_or_else(|| {
            PipelineError::bad_request(format!("`{uri}` does not start with `{SCHEME}`"))
        })?;
        let (bucket, key) = rest.split_once('/').ok_or_else(|| {
            PipelineError::bad_request(format!("`{uri}` is missing the bucket/key separator"))
        })?;
        ObjectRef::new(bucket, key)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.bucket, self.key)
    }
}

/// Parses every reference in `uris`, failing on the first malformed one.
pub fn parse_all<S: AsRef<str>>(uris: &[S]) -> PipelineResult<Vec<ObjectRef>> {
    uris.iter().map(|uri| uri.as_ref().parse()).collect()
}

/// `chunks/<source key minus .txt>_chunk_<index>.txt`
pub fn chunk_key(source_key: &str, index: usize) -> String {
    let stem = source_key.strip_suffix(TEXT_SUFFIX).unwrap_or(source_key);
    format!("{CHUNK_DIR}{stem}_chunk_{index}{TEXT_SUFFIX}")
}

/// Replaces the first `chunks/` with `mapped/` and the first `.txt` with
/// `_mapped.json`. A key neither rule touches gets `_mapped.json` appended so
/// the table never lands on top of its own chunk.
pub fn mapped_key(chunk_key: &str) -> String {
    let key = chunk_key
        .replacen(CHUNK_DIR, MAPPED_DIR, 1)
        .replacen(TEXT_SUFFIX, MAPPED_SUFFIX, 1);
    if key == chunk_key {
        format!("{key}{MAPPED_SUFFIX}")
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let r: ObjectRef = "s3://words/input.txt".parse().unwrap();
        assert_eq!(r.bucket(), "words");
        assert_eq!(r.key(), "input.txt");
        assert_eq!(r.to_string(), "s3://words/input.txt");
    }

    #[test]
    fn key_keeps_nested_slashes() {
        let r: ObjectRef = "s3://words/a/b/c.json".parse().unwrap();
        assert_eq!(r.bucket(), "words");
        assert_eq!(r.key(), "a/b/c.json");
    }

    #[test]
    fn rejects_malformed_references() {
        for uri in [
            "words/input.txt",
            "http://words/input.txt",
            "s3://words",
            "s3:///input.txt",
            "s3://words/",
            "s3://words/s3://other/key",
            "",
        ] {
            let err = uri.parse::<ObjectRef>().unwrap_err();
            assert!(err.is_bad_request(), "{uri} gave {err}");
        }
    }

    #[test]
    fn chunk_keys_follow_naming_convention() {
        assert_eq!(chunk_key("input.txt", 0), "chunks/input_chunk_0.txt");
        assert_eq!(chunk_key("books/moby.txt", 2), "chunks/books/moby_chunk_2.txt");
        assert_eq!(chunk_key("notes", 1), "chunks/notes_chunk_1.txt");
    }

    #[test]
    fn mapped_keys_follow_naming_convention() {
        assert_eq!(mapped_key("chunks/input_chunk_1.txt"), "mapped/input_chunk_1_mapped.json");
        // only the first occurrence of each pattern is replaced
        assert_eq!(mapped_key("chunks/a.txt.txt"), "mapped/a_mapped.json.txt");
        assert_eq!(mapped_key("other/raw.txt"), "other/raw_mapped.json");
        assert_eq!(mapped_key("other/raw.bin"), "other/raw.bin_mapped.json");
    }

    #[test]
    fn derived_references_stay_in_bucket() {
        let source: ObjectRef = "s3://words/input.txt".parse().unwrap();
        let chunk = source.chunk(1);
        assert_eq!(chunk.to_string(), "s3://words/chunks/input_chunk_1.txt");
        assert_eq!(
            chunk.mapped().to_string(),
            "s3://words/mapped/input_chunk_1_mapped.json"
        );
        assert_eq!(
            ObjectRef::final_in("out").unwrap().to_string(),
            "s3://out/final/word_count_final.json"
        );
    }

    #[test]
    fn parse_all_stops_at_first_bad_reference() {
        let ok = parse_all(&["s3://a/x", "s3://b/y"]).unwrap();
        assert_eq!(ok.len(), 2);
        assert!(parse_all(&["s3://a/x", "nope"]).unwrap_err().is_bad_request());
    }
}
