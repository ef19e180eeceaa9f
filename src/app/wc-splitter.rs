use std::sync::Arc;

use anyhow::ensure;
use clap::Parser;
use wordpipe::cmd::splitter::Args;
use wordpipe::server::{self, StageState};
use wordpipe::{utils, MAX_CHUNK_COUNT};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    utils::init_tracing(args.verbose);
    ensure!(
        (1..=MAX_CHUNK_COUNT).contains(&args.chunk_count),
        "--chunk-count must be between 1 and {MAX_CHUNK_COUNT}"
    );

    let store = args.store.connect().await;
    let state = StageState::new(Arc::new(store)).with_chunk_count(args.chunk_count);

    server::serve(&args.listen, server::splitter_router(state)).await
}
