//! A three-stage word count pipeline.
//!
//! A splitter cuts a source object into byte-range chunks, mappers count the
//! words in each chunk, and a reducer sums the per-chunk tables into a final
//! tally. Stages never talk to each other directly: every intermediate result
//! is written to an S3-compatible object store and handed on by reference.

use std::collections::BTreeMap;

pub mod cmd;
pub mod driver;
pub mod error;
pub mod objref;
pub mod server;
pub mod stage;
pub mod standalone;
pub mod store;
pub mod utils;
pub mod workload;

pub use error::{PipelineError, PipelineResult};
pub use objref::ObjectRef;

/////////////////////////////////////////////////////////////////////////////
// Frequency tables
/////////////////////////////////////////////////////////////////////////////

/// A word -> occurrence count table.
///
/// Ordered by word, so the same counts always serialize to the same bytes.
pub type WordCounts = BTreeMap<String, u64>;

/// Number of chunks the splitter produces unless configured otherwise.
pub const DEFAULT_CHUNK_COUNT: usize = 3;

/// Upper bound on the chunk count a split may ask for.
pub const MAX_CHUNK_COUNT: usize = 1024;
