use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use url::Url;

// govinfo.gov rejects the default reqwest agent.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:88.0) Gecko/20100101 Firefox/88.0";

const GOVINFO_BASE: &str = "https://www.govinfo.gov";

/// URL templates for one govinfo-shaped source, so tests can point the
/// pipeline at a local server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn govinfo() -> Self {
        Self::new(GOVINFO_BASE).expect("static base URL")
    }

    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid base URL {base}"))?;
        if base.host_str().is_none() {
            bail!("base URL {base} has no host");
        }
        Ok(Self { base })
    }

    /// The only host the fetcher will talk to.
    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    pub fn zip_url(&self, date: &str) -> String {
        format!(
            "{}/content/pkg/CREC-{date}.zip",
            self.base.as_str().trim_end_matches('/')
        )
    }

    pub fn mods_url(&self, date: &str) -> String {
        format!(
            "{}/metadata/pkg/CREC-{date}/mods.xml",
            self.base.as_str().trim_end_matches('/')
        )
    }
}

/// Content cache keyed by the URL path. Swappable so an eviction or TTL
/// policy can be introduced without touching extraction logic.
pub trait Cache {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, content: &str) -> Result<()>;
}

/// Maps keys directly to files under a root directory. No freshness check:
/// a present file wins unconditionally.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.root.join(key);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading cache {}", path.display()))?;
        Ok(Some(content))
    }

    fn put(&self, key: &str, content: &str) -> Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache dir {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("writing cache {}", path.display()))?;
        Ok(())
    }
}

/// Resolves a URL to its text content through the cache, fetching and
/// persisting on a miss. Refuses any host other than the trusted one.
pub struct Fetcher<C: Cache> {
    client: reqwest::Client,
    trusted_host: String,
    cache: C,
}

impl<C: Cache> Fetcher<C> {
    pub fn new(trusted_host: &str, cache: C) -> Self {
        Self {
            client: reqwest::Client::new(),
            trusted_host: trusted_host.to_string(),
            cache,
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).with_context(|| format!("invalid URL {url}"))?;
        let host = parsed.host_str().unwrap_or_default();
        if host != self.trusted_host {
            bail!(
                "refusing to fetch {url}: host {host:?} is not the trusted host {:?}",
                self.trusted_host
            );
        }

        let key = parsed.path().trim_start_matches('/').to_string();
        if let Some(content) = self.cache.get(&key)? {
            debug!("cache hit for {key}");
            return Ok(content);
        }

        info!("GET {url}");
        let body = self
            .client
            .get(parsed)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("fetching {url}"))?
            .text()
            .await?;

        self.cache.put(&key, &body)?;
        Ok(body)
    }
}

// ── Tests ──
