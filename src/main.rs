use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crec_scraper::fetch::Endpoints;
use crec_scraper::paths::Layout;
use crec_scraper::{dates, pipeline};

#[derive(Parser)]
#[command(
    name = "crec_scraper",
    about = "Congressional Record scraper for govinfo.gov"
)]
struct Cli {
    /// Data directory (content/, metadata/, json_output/, tmp/)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, parse and clean the record for the given dates
    Run {
        /// Dates in YYYY-MM-DD form
        dates: Vec<String>,
        /// Read dates from a file, one per line ('#' starts a comment)
        #[arg(long)]
        dates_file: Option<PathBuf>,
    },
    /// List the session dates of a congress from congress.gov
    Dates {
        /// Congress number, e.g. 117
        #[arg(short, long, default_value = "117")]
        congress: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { dates, dates_file } => {
            let mut dates = dates;
            if let Some(path) = dates_file {
                dates.extend(read_dates_file(&path)?);
            }
            if dates.is_empty() {
                println!("No dates given. Pass dates or --dates-file.");
                return Ok(());
            }

            let layout = Layout::new(&cli.root);
            let endpoints = Endpoints::govinfo();
            let stats = pipeline::run(&dates, &layout, &endpoints).await?;
            println!(
                "Done: {} dates processed, {} sections written.",
                stats.processed, stats.sections
            );
            if stats.failed.is_empty() {
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "{} of {} dates failed: {}",
                    stats.failed.len(),
                    dates.len(),
                    stats.failed.join(", ")
                ))
            }
        }
        Commands::Dates { congress } => {
            let sessions = dates::session_dates(congress).await?;
            for date in &sessions {
                println!("{date}");
            }
            println!("{} session dates.", sessions.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_dates_file(path: &PathBuf) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    Ok(content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
