//! Versioned bucket names.
//!
//! `{prefix}-{role}-{version}`. Bumping the version yields a disjoint pair of
//! names, so activation can purge everything written by older versions.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketRole {
    /// Populated once at install time from the manifest.
    Precache,
    /// Filled lazily by successful same-origin GETs.
    Runtime,
}

impl BucketRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketRole::Precache => "precache",
            BucketRole::Runtime => "runtime",
        }
    }
}

impl fmt::Display for BucketRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketName(String);

impl BucketName {
    pub fn new(prefix: &str, role: BucketRole, version: &str) -> Self {
        Self(format!("{prefix}-{role}-{version}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for BucketName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// BucketSet は 1 バージョンのゲートウェイが持つ 2 つのバケット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSet {
    pub precache: BucketName,
    pub runtime: BucketName,
}

impl BucketSet {
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            precache: BucketName::new(prefix, BucketRole::Precache, version),
            runtime: BucketName::new(prefix, BucketRole::Runtime, version),
        }
    }

    /// Allow-list check used during activation.
    pub fn contains(&self, name: &str) -> bool {
        self.precache == *name || self.runtime == *name
    }
}
