use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::fetch::{Endpoints, USER_AGENT};
use crate::paths::Layout;

/// Download the per-date zip bundle, persist it, extract it into the staging
/// area and relocate the HTML subtree and `mods.xml` into their final
/// content/metadata locations.
///
/// The relocation targets are exactly the cache paths the fetcher derives
/// from the rendition/metadata URLs, so the download pre-populates the cache
/// for every section of the date.
pub async fn download_and_extract(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    layout: &Layout,
    date: &str,
) -> Result<()> {
    let url = endpoints.zip_url(date);
    info!("downloading archive {url}");
    let bytes = client
        .get(&url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?
        .error_for_status()
        .with_context(|| format!("downloading {url}"))?
        .bytes()
        .await?;
    debug!("archive for {date}: {} bytes", bytes.len());

    // Persist the raw bundle verbatim.
    let archive_path = layout.archive_path(date);
    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&archive_path, &bytes)
        .with_context(|| format!("writing {}", archive_path.display()))?;

    let staging = layout.staging_dir();
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("clearing staging dir {}", staging.display()))?;
    }
    fs::create_dir_all(&staging)?;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_ref()))
        .with_context(|| format!("reading zip {url}"))?;
    archive
        .extract(&staging)
        .with_context(|| format!("extracting into {}", staging.display()))?;

    relocate(layout, date, &staging)
}

/// Move `tmp/CREC-<date>/html` and `tmp/CREC-<date>/mods.xml` into the
/// content and metadata areas, replacing any previous content for the date.
fn relocate(layout: &Layout, date: &str, staging: &Path) -> Result<()> {
    let extracted = staging.join(format!("CREC-{date}"));

    let content_dir = layout.content_dir(date);
    let html_dst = content_dir.join("html");
    if html_dst.exists() {
        fs::remove_dir_all(&html_dst)
            .with_context(|| format!("clearing {}", html_dst.display()))?;
    }
    fs::create_dir_all(&content_dir)?;

    let html_src = extracted.join("html");
    fs::rename(&html_src, &html_dst).with_context(|| {
        format!(
            "moving {} to {}",
            html_src.display(),
            html_dst.display()
        )
    })?;

    let metadata_dir = layout.metadata_dir(date);
    fs::create_dir_all(&metadata_dir)?;
    let mods_src = extracted.join("mods.xml");
    let mods_dst = metadata_dir.join("mods.xml");
    if mods_dst.exists() {
        fs::remove_file(&mods_dst)?;
    }
    fs::rename(&mods_src, &mods_dst).with_context(|| {
        format!(
            "moving {} to {}",
            mods_src.display(),
            mods_dst.display()
        )
    })?;

    debug!("relocated archive contents for {date}");
    Ok(())
}

// ── Tests ──
