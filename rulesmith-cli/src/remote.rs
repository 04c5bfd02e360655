//! Remote rule sets - fetch http(s) rule set references and cache them
//!
//! Downloads are stored in the user's cache directory, keyed by the SHA-256
//! of the URL, and reused across invocations. Local file locations are read
//! through the core opener unchanged.

use anyhow::{anyhow, Context, Result};
use rulesmith_core::reference::RuleSetReferenceId;
use rulesmith_core::resolvers::{open_location, ContentOpener};
use rulesmith_core::{ContentError, ResolvedLocation};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Largest rule set body accepted from a server
const MAX_RULE_SET_BYTES: u64 = 8 * 1024 * 1024;

pub struct RemoteRuleSets {
    /// e.g. ~/.cache/rulesmith/rulesets
    cache_dir: PathBuf,
    /// Serve from the cache only
    offline: bool,
    /// Ignore cached copies and always download
    refresh: bool,
}

impl RemoteRuleSets {
    /// Create a fetcher using the default cache directory
    pub fn new() -> Result<Self> {
        let base = dirs::cache_dir().ok_or_else(|| anyhow!("Could not determine cache directory"))?;
        Ok(Self::with_cache_dir(base.join("rulesmith").join("rulesets")))
    }

    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            offline: false,
            refresh: false,
        }
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file for a URL: `<cache_dir>/<sha256(url)>.xml`
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.cache_dir.join(format!("{digest:x}.xml"))
    }

    /// Rule set bytes for `url`, from the cache when possible
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let cached = self.cache_path(url);

        if !self.refresh && cached.is_file() {
            debug!(url, cache = %cached.display(), "rule set served from cache");
            return fs::read(&cached)
                .with_context(|| format!("Failed to read cached rule set: {}", cached.display()));
        }

        if self.offline {
            return Err(anyhow!("{url} is not cached and network access is disabled"));
        }

        let bytes = self.download(url)?;

        fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", self.cache_dir.display())
        })?;
        fs::write(&cached, &bytes)
            .with_context(|| format!("Failed to cache rule set: {}", cached.display()))?;
        info!(url, bytes = bytes.len(), "downloaded rule set");

        Ok(bytes)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = ureq::get(url)
            .call()
            .with_context(|| format!("Failed to download from {}", url))?;

        read_limited(response.into_reader(), MAX_RULE_SET_BYTES)
            .with_context(|| format!("Failed to read response from {}", url))
    }

    /// Read a resolved location: URLs through this fetcher, files from disk
    pub fn open(
        &self,
        location: &ResolvedLocation,
        reference: &RuleSetReferenceId,
    ) -> std::result::Result<Vec<u8>, ContentError> {
        match location {
            ResolvedLocation::Url(url) => self.fetch(url).map_err(|e| ContentError::NotFound {
                location: url.clone(),
                reason: format!("{e:#}"),
            }),
            ResolvedLocation::File(_) => open_location(location, reference),
        }
    }

    /// Content opener for `ProjectConfigurator::with_opener`
    pub fn into_opener(self) -> Box<ContentOpener<'static>> {
        Box::new(move |location: &ResolvedLocation, reference: &RuleSetReferenceId| {
            self.open(location, reference)
        })
    }
}

/// Read at most `limit` bytes. A body longer than that is an error, so a
/// truncated rule set never reaches the cache.
fn read_limited(reader: impl Read, limit: u64) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(limit + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(anyhow!("rule set exceeds {limit} bytes"));
    }
    Ok(bytes)
}
