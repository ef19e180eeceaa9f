use clap::Parser;

use super::StoreArgs;
use crate::DEFAULT_CHUNK_COUNT;

#[derive(Parser, Debug)]
#[command(version, about = "Splitter service: cuts a source object into chunks", long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "WORDPIPE_LISTEN")]
    pub listen: String,

    /// Number of chunks per source object, unless a request overrides it
    #[arg(short = 'n', long, default_value_t = DEFAULT_CHUNK_COUNT, env = "WORDPIPE_CHUNK_COUNT")]
    pub chunk_count: usize,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
