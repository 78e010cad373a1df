use std::sync::LazyLock;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clean;
use crate::fetch::{Cache, Fetcher};
use crate::mods::{Document, SectionNode};

static PRE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body pre").unwrap());

/// One legislative proceeding entry. Records are never partial: a section
/// missing any field is dropped during extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRecord {
    pub section_name: String,
    pub title: String,
    pub source_url: String,
    pub page_range: String,
    pub raw_text: String,
    pub cleaned_text: String,
    pub speakers: Vec<String>,
    pub speaker_affiliation: String,
    pub speaker_role: String,
    pub citation: String,
}

/// Extract one section record from a metadata granule, fetching its HTML
/// rendition for the body text.
///
/// `Ok(None)` means the granule is incomplete and is dropped; this covers a
/// missing citation too (logged at warn rather than debug, since the rest of
/// the granule was well-formed). `Err` means a network or IO failure, fatal
/// for the date being processed.
pub async fn extract<C: Cache>(
    node: &SectionNode,
    fetcher: &Fetcher<C>,
) -> Result<Option<SectionRecord>> {
    let Some(section_name) = node.section_name() else {
        return Ok(skip("partName"));
    };
    let Some(title) = node.title() else {
        return Ok(skip("title"));
    };
    let Some(source_url) = node.html_url() else {
        return Ok(skip("HTML rendition URL"));
    };
    let Some(page_range) = node.page_range() else {
        return Ok(skip("page labels"));
    };
    if node.member().is_none() {
        return Ok(skip("congMember"));
    }
    let Some(speakers) = node.speakers() else {
        return Ok(skip("namePart"));
    };
    let Some(affiliation) = node.affiliation() else {
        return Ok(skip("affiliation"));
    };
    let Some(role) = node.role() else {
        return Ok(skip("roleTerm"));
    };
    let Some(citation) = node.citation() else {
        warn!("dropping section {title:?}: missing preferred citation");
        return Ok(None);
    };

    let html = fetcher.fetch(source_url).await?;
    let Some(raw_text) = pre_text(&html) else {
        debug!("dropping section {title:?}: rendition has no pre-formatted body");
        return Ok(None);
    };
    let cleaned_text = clean::clean(&raw_text);

    Ok(Some(SectionRecord {
        section_name: section_name.to_string(),
        title: title.to_string(),
        source_url: source_url.to_string(),
        page_range,
        raw_text,
        cleaned_text,
        speakers,
        speaker_affiliation: affiliation.to_string(),
        speaker_role: role.to_string(),
        citation: citation.to_string(),
    }))
}

fn skip(field: &str) -> Option<SectionRecord> {
    debug!("dropping section: missing {field}");
    None
}

/// Walk the metadata document's sections in document order, collecting the
/// records that extract successfully. Failed sections are skipped in place;
/// relative order is preserved.
pub async fn walk<C: Cache>(doc: &Document, fetcher: &Fetcher<C>) -> Result<Vec<SectionRecord>> {
    let total = doc.sections().count();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} sections")?
            .progress_chars("=> "),
    );

    let mut records = Vec::new();
    for section in doc.sections() {
        if let Some(record) = extract(section, fetcher).await? {
            records.push(record);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    debug!("extracted {} of {} sections", records.len(), total);
    Ok(records)
}

/// Text of the first pre-formatted block in the page body.
fn pre_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let pre = doc.select(&PRE_SELECTOR).next()?;
    Some(pre.text().collect())
}

// ── Tests ──
