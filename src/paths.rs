use std::path::{Path, PathBuf};

/// On-disk layout rooted at the data directory.
///
/// Three persistent areas plus a transient staging dir:
/// - `content/pkg/CREC-<date>/` — raw zip and extracted HTML renditions
/// - `metadata/pkg/CREC-<date>/` — the per-date MODS descriptor
/// - `json_output/` — one cleaned JSON file per date
/// - `tmp/` — zip extraction staging, cleared on every use
///
/// The content/metadata trees double as the fetch cache: a resource URL's
/// path maps to the same relative path under the root.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the raw zip bundle for a date is persisted.
    pub fn archive_path(&self, date: &str) -> PathBuf {
        self.root.join(format!("content/pkg/CREC-{date}.zip"))
    }

    /// Extracted content area for a date (holds the `html/` subtree).
    pub fn content_dir(&self, date: &str) -> PathBuf {
        self.root.join(format!("content/pkg/CREC-{date}"))
    }

    /// Metadata area for a date (holds `mods.xml`).
    pub fn metadata_dir(&self, date: &str) -> PathBuf {
        self.root.join(format!("metadata/pkg/CREC-{date}"))
    }

    /// Transient zip extraction area.
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    /// Output JSON file for a date.
    pub fn output_path(&self, date: &str) -> PathBuf {
        self.root.join(format!("json_output/Cleaned-CREC-{date}.json"))
    }
}
