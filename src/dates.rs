use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info};

use crate::fetch::USER_AGENT;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
// Session-date lines carry the record's issue number, e.g. "- No. 99".
static ISSUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"No\. \d").unwrap());

/// Fetch the congress.gov browse-by-date page for a congress and return the
/// dates on which a session occurred, as `YYYY-MM-DD` tokens in page order.
pub async fn session_dates(congress: u16) -> Result<Vec<String>> {
    let url = browse_url(congress);
    info!("fetching session dates: {url}");
    let client = reqwest::Client::new();
    let html = client
        .get(&url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?
        .text()
        .await?;
    parse_session_dates(&html)
}

pub fn browse_url(congress: u16) -> String {
    format!(
        "https://www.congress.gov/congressional-record/{}-congress/browse-by-date",
        ordinal(congress)
    )
}

/// Strip markup, then read the lines after the "Browse by Date" marker that
/// carry an issue number. Each looks like "June 8, 2021 - No. 99".
fn parse_session_dates(html: &str) -> Result<Vec<String>> {
    let text = TAG_RE.replace_all(html, "");
    let lines: Vec<String> = text
        .lines()
        .map(|line| WS_RE.replace_all(line.trim(), " ").to_string())
        .filter(|line| !line.is_empty())
        .collect();

    let start = lines
        .iter()
        .position(|line| line.eq_ignore_ascii_case("browse by date"))
        .context("page has no 'Browse by Date' marker")?;

    let mut dates = Vec::new();
    for line in &lines[start..] {
        if !ISSUE_RE.is_match(line) {
            continue;
        }
        let label = line.split(" -").next().unwrap_or(line).trim();
        match NaiveDate::parse_from_str(label, "%B %d, %Y") {
            Ok(date) => dates.push(date.format("%Y-%m-%d").to_string()),
            Err(_) => debug!("skipping non-date line {line:?}"),
        }
    }
    Ok(dates)
}

fn ordinal(n: u16) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

// ── Tests ──
