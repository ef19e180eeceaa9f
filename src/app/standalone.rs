use anyhow::Result;
use clap::Parser;
use wordpipe::standalone::{self, Args};
use wordpipe::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    utils::init_tracing(args.verbose);

    let counts = standalone::run(&args).await?;
    println!(
        "{} distinct words written to {}",
        counts.len(),
        args.output.display()
    );
    for (word, count) in standalone::top_words(&counts, args.top) {
        println!("{count:>8}\t{word}");
    }
    Ok(())
}
