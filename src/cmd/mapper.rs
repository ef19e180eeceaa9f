use clap::Parser;

use super::StoreArgs;

#[derive(Parser, Debug)]
#[command(version, about = "Mapper service: counts the words in one chunk", long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "WORDPIPE_LISTEN")]
    pub listen: String,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
