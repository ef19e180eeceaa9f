use std::sync::Arc;

use clap::Parser;
use wordpipe::cmd::{self, reducer::Args};
use wordpipe::server::{self, StageState};
use wordpipe::utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    utils::init_tracing(args.verbose);

    let store = args.store.connect().await;
    if let Some(bucket) = &args.default_bucket {
        cmd::check_bucket(&store, bucket).await;
    }
    let state = StageState::new(Arc::new(store)).with_default_bucket(args.default_bucket.clone());

    server::serve(&args.listen, server::reducer_router(state)).await
}
