//! Utility functions shared by the stages and binaries.
//!

use std::borrow::Cow;

use encoding_rs::UTF_8;
use tracing_subscriber::EnvFilter;

/// Decode a chunk of text as UTF-8.
///
/// Chunks are cut at byte offsets, so a multi-byte character may be split
/// across two of them. Invalid sequences become U+FFFD instead of failing
/// the whole chunk. A leading byte order mark is kept as-is.
pub fn decode_text(buf: &[u8]) -> Cow<'_, str> {
    let (text, _had_errors) = UTF_8.decode_without_bom_handling(buf);
    text
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows the `-v` count.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}
