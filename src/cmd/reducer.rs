use clap::Parser;

use super::StoreArgs;

#[derive(Parser, Debug)]
#[command(version, about = "Reducer service: merges per-chunk word counts", long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "WORDPIPE_LISTEN")]
    pub listen: String,

    /// Bucket for the final table when a request names none. Without it the
    /// bucket of the first table reference is used.
    #[arg(short, long, env = "WORDPIPE_DEFAULT_BUCKET")]
    pub default_bucket: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
