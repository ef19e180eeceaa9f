use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glob::glob;
use itertools::Itertools;
use tracing::info;

use crate::store::MemoryStore;
use crate::{ObjectRef, WordCounts, DEFAULT_CHUNK_COUNT};

pub mod engine;

pub use engine::{Pipeline, RunReport};

/// Bucket local input files are loaded into.
pub const LOCAL_BUCKET: &str = "local";

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Run the word count pipeline in-process on local files", long_about = None)]
pub struct Args {
    /// Glob pattern for the input files
    #[arg(short, long)]
    pub input: String,

    /// File to write the final word count table to (JSON)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of chunks each input file is split into
    #[arg(short = 'n', long, default_value_t = DEFAULT_CHUNK_COUNT, env = "WORDPIPE_CHUNK_COUNT")]
    pub chunk_count: usize,

    /// Print the N most frequent words when done
    #[arg(short, long, default_value_t = 10)]
    pub top: usize,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Load every file matching `args.input`, count its words through the
/// pipeline, and write the merged table to `args.output`.
pub async fn run(args: &Args) -> Result<WordCounts> {
    let store = MemoryStore::new();
    let mut sources = Vec::new();
    for path in glob(&args.input)?.flatten() {
        let key = path.to_string_lossy().trim_start_matches('/').to_string();
        let content = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        info!("loaded {} ({} bytes)", path.display(), content.len());
        store.insert(LOCAL_BUCKET, &key, content);
        sources.push(ObjectRef::new(LOCAL_BUCKET, key)?.to_string());
    }
    if sources.is_empty() {
        bail!("no input files match `{}`", args.input);
    }

    let report = Pipeline::new(&store)
        .with_chunk_count(args.chunk_count)
        .run(&sources)
        .await?;
    if !report.skipped.is_empty() {
        info!("{} chunks were skipped", report.skipped.len());
    }

    let body = store
        .peek(report.output.bucket(), report.output.key())
        .with_context(|| format!("{} was not written", report.output))?;
    let counts: WordCounts = serde_json::from_slice(&body)?;
    fs::write(&args.output, serde_json::to_vec_pretty(&counts)?)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(counts)
}

/// The `n` most frequent words, ties broken alphabetically.
pub fn top_words(counts: &WordCounts, n: usize) -> Vec<(&str, u64)> {
    counts
        .iter()
        .map(|(word, count)| (word.as_str(), *count))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .take(n)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: String, output: PathBuf) -> Args {
        Args {
            input,
            output,
            chunk_count: DEFAULT_CHUNK_COUNT,
            top: 3,
            verbose: 0,
        }
    }

    #[tokio::test]
    async fn counts_local_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "Hello, world! hello.\n").unwrap();
        fs::write(dir.path().join("b.txt"), "world peace world\n").unwrap();
        let output = dir.path().join("out.json");

        let input = format!("{}/*.txt", dir.path().display());
        let counts = run(&args(input, output.clone())).await.unwrap();
        assert_eq!(counts["world"], 3);
        assert_eq!(counts["peace"], 1);

        let written: WordCounts = serde_json::from_slice(&fs::read(output).unwrap()).unwrap();
        assert_eq!(written, counts);
    }

    #[tokio::test]
    async fn no_matching_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = format!("{}/*.none", dir.path().display());
        let err = run(&args(input, dir.path().join("out.json"))).await.unwrap_err();
        assert!(err.to_string().contains("no input files"));
    }

    #[test]
    fn top_words_orders_by_count_then_word() {
        let counts: WordCounts = [("b", 2), ("a", 2), ("c", 5), ("d", 1)]
            .into_iter()
            .map(|(w, c)| (w.to_string(), c))
            .collect();
        assert_eq!(top_words(&counts, 3), vec![("c", 5), ("a", 2), ("b", 2)]);
    }
}
