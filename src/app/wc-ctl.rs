use anyhow::Result;
use clap::Parser;
use wordpipe::cmd::ctl::{Args, Commands};
use wordpipe::driver::{Driver, PhaseTimings, Summary};
use wordpipe::utils;

fn display_timings(run: u32, t: &PhaseTimings) {
    println!(
        "{run}\t{:.3}\t{:.3}\t{:.3}\t{:.3}",
        t.split.as_secs_f64(),
        t.map.as_secs_f64(),
        t.reduce.as_secs_f64(),
        t.total.as_secs_f64()
    );
}

fn display_summary(summary: &Summary) {
    let avg = &summary.average;
    println!("-----------------------------------");
    println!("Averages:");
    println!("Split:\t{:.3} sec", avg.split.as_secs_f64());
    println!("Map:\t{:.3} sec", avg.map.as_secs_f64());
    println!("Reduce:\t{:.3} sec", avg.reduce.as_secs_f64());
    println!("Total:\t{:.3} sec", avg.total.as_secs_f64());
    println!("-----------------------------------");
    println!(
        "Estimated sequential time:\t{:.3} sec",
        summary.sequential_estimate.as_secs_f64()
    );
    println!("Speedup:\t{:.2}x", summary.speedup);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    utils::init_tracing(args.verbose);

    let driver = Driver::new(&args.splitter, &args.mappers, &args.reducer)?;

    match args.command {
        Commands::Run { source, bucket, runs } => {
            println!("Run\tSplit\tMap\tReduce\tTotal");
            let mut timings = Vec::new();
            for run in 1..=runs.max(1) {
                let outcome = driver.run(&source, bucket.as_deref()).await?;
                display_timings(run, &outcome.timings);
                if !outcome.skipped.is_empty() {
                    println!("\tskipped {} chunks: {:?}", outcome.skipped.len(), outcome.skipped);
                }
                if run == runs.max(1) {
                    println!("Final result: {}", outcome.final_url);
                }
                timings.push(outcome.timings);
            }
            if timings.len() > 1 {
                if let Some(summary) = Summary::from_runs(&timings, driver.mapper_count()) {
                    display_summary(&summary);
                }
            }
        }
        Commands::Split { source } => {
            for chunk in driver.split(&source).await? {
                println!("{chunk}");
            }
        }
        Commands::Map { chunk } => {
            println!("{}", driver.map_chunk(0, &chunk).await?);
        }
        Commands::Reduce { tables, bucket } => {
            println!("{}", driver.reduce(tables, bucket).await?);
        }
    }

    Ok(())
}
