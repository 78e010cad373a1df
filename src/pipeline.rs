use std::fs;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info};

use crate::archive;
use crate::extract;
use crate::fetch::{Endpoints, FileCache, Fetcher};
use crate::mods;
use crate::paths::Layout;

#[derive(Debug)]
pub struct RunStats {
    pub processed: usize,
    pub sections: usize,
    pub failed: Vec<String>,
}

/// Process each date token in input order, one at a time.
///
/// A failure aborts that date only; the run continues with the next date and
/// the failed tokens are reported in the returned stats so the caller can
/// exit non-zero.
pub async fn run(dates: &[String], layout: &Layout, endpoints: &Endpoints) -> Result<RunStats> {
    for date in dates {
        validate_token(date)?;
    }

    let fetcher = Fetcher::new(endpoints.host(), FileCache::new(layout.root()));
    let client = reqwest::Client::new();

    let mut stats = RunStats {
        processed: 0,
        sections: 0,
        failed: Vec::new(),
    };
    for date in dates {
        info!("processing {date}");
        match process_date(date, layout, endpoints, &client, &fetcher).await {
            Ok(count) => {
                stats.processed += 1;
                stats.sections += count;
                println!(
                    "{date}: {count} sections -> {}",
                    layout.output_path(date).display()
                );
            }
            Err(e) => {
                error!("{date} failed: {e:#}");
                stats.failed.push(date.clone());
            }
        }
    }
    Ok(stats)
}

/// One date, start to finish: download and relocate the archive, parse the
/// metadata, walk the sections, serialize the records.
async fn process_date(
    date: &str,
    layout: &Layout,
    endpoints: &Endpoints,
    client: &reqwest::Client,
    fetcher: &Fetcher<FileCache>,
) -> Result<usize> {
    archive::download_and_extract(client, endpoints, layout, date).await?;

    // The relocation just wrote mods.xml at this URL's cache path, so this
    // is a guaranteed cache hit; it keeps one code path for metadata access.
    let xml = fetcher.fetch(&endpoints.mods_url(date)).await?;
    let doc = mods::parse_document(&xml)
        .with_context(|| format!("parsing metadata for {date}"))?;

    let records = extract::walk(&doc, fetcher).await?;

    let out = layout.output_path(date);
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(&records)?;
    fs::write(&out, json).with_context(|| format!("writing {}", out.display()))?;

    Ok(records.len())
}

/// Date tokens are externally supplied; reject anything that is not a real
/// `YYYY-MM-DD` calendar date before touching the network.
pub fn validate_token(date: &str) -> Result<()> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid date token {date:?} (expected YYYY-MM-DD)"))?;
    if parsed.format("%Y-%m-%d").to_string() != date {
        anyhow::bail!("invalid date token {date:?} (expected zero-padded YYYY-MM-DD)");
    }
    Ok(())
}
