use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Drive the word count pipeline services", long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Splitter service address
    #[arg(short = 'S', long, default_value = "127.0.0.1:8080", env = "WORDPIPE_SPLITTER")]
    pub splitter: String,

    /// Mapper service address; repeat for a pool, chunks go round-robin
    #[arg(short = 'M', long = "mapper", default_value = "127.0.0.1:8081",
          env = "WORDPIPE_MAPPERS", value_delimiter = ',')]
    pub mappers: Vec<String>,

    /// Reducer service address
    #[arg(short = 'R', long, default_value = "127.0.0.1:8082", env = "WORDPIPE_REDUCER")]
    pub reducer: String,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run split, map and reduce for one source object and report timings
    Run {
        /// Source object, as s3://bucket/key
        #[arg(short, long)]
        source: String,

        /// Bucket for the final table; defaults to the reducer's choice
        #[arg(short, long)]
        bucket: Option<String>,

        /// Repeat the run this many times and print averages
        #[arg(short, long, default_value_t = 1)]
        runs: u32,
    },
    /// Split one source object and print the chunk references
    Split {
        #[arg(short, long)]
        source: String,
    },
    /// Map one chunk on the first mapper and print the table reference
    Map {
        #[arg(short, long)]
        chunk: String,
    },
    /// Reduce the given tables and print the final reference
    Reduce {
        /// Table references; none at all is a valid, empty run
        tables: Vec<String>,

        #[arg(short, long)]
        bucket: Option<String>,
    },
}
