use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use jobdoor::{
    configuration::get_configuration,
    services::{export, get_jobs, Droid},
};

#[derive(Parser)]
#[command(name = "jobdoor", about = "Scrape job postings from Glassdoor search results")]
struct Cli {
    /// Search keyword, e.g. "data scientist"
    keyword: String,

    /// Maximum number of job records to collect
    #[arg(short = 'n', long, default_value = "10")]
    num_jobs: usize,

    /// Write the CSV table to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let configuration = get_configuration().expect("Failed to read configuration.");

    let droid = Droid::new(&configuration.webdriver).await?;
    let records = get_jobs(&droid, &configuration.scrape, &cli.keyword, cli.num_jobs).await;

    // Tear the browser down even when the run failed.
    let quit_result = droid.quit().await;
    let records = records?;
    quit_result?;

    log::info!("Collected {} job records", records.len());

    match cli.output {
        Some(path) => {
            let file = File::create(&path)?;
            export::write_table(file, &records)?;
            println!("Wrote {} rows to {}", records.len(), path.display());
        }
        None => export::write_table(io::stdout().lock(), &records)?,
    }

    Ok(())
}
