use std::sync::Arc;

use clap::Parser;
use wordpipe::cmd::mapper::Args;
use wordpipe::server::{self, StageState};
use wordpipe::utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    utils::init_tracing(args.verbose);

    let store = args.store.connect().await;
    let state = StageState::new(Arc::new(store));

    server::serve(&args.listen, server::mapper_router(state)).await
}
