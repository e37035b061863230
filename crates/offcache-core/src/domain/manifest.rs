//! Precache manifest: the ordered list of resources fetched at install time.

use serde::{Deserialize, Serialize};
use url::Url;

use super::request::Request;

/// デフォルトで precache するパス
pub const DEFAULT_MANIFEST: [&str; 6] = [
    "/",
    "/status",
    "/weather",
    "/sea-temp-test",
    "/offline",
    "/manifest.json",
];

/// デフォルトのオフラインページ
pub const DEFAULT_OFFLINE_PAGE: &str = "/offline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecacheManifest(Vec<String>);

impl PrecacheManifest {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(Into::into).collect())
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve each entry against `base`, keeping manifest order.
    ///
    /// Returns the first entry that fails to parse alongside the error.
    pub fn resolve(&self, base: &Url) -> Result<Vec<Url>, (String, url::ParseError)> {
        self.0
            .iter()
            .map(|entry| Request::resolve(base, entry).map_err(|e| (entry.clone(), e)))
            .collect()
    }
}

impl Default for PrecacheManifest {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST)
    }
}
