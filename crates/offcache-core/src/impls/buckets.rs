//! Ordered bucket collection shared by the in-memory and filesystem stores.

use serde::{Deserialize, Serialize};

use crate::domain::{CacheError, CacheKey, CachedResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    key: CacheKey,
    value: CachedResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredBucket {
    name: String,
    entries: Vec<StoredEntry>,
}

impl StoredBucket {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    fn get(&self, key: &CacheKey) -> Option<&CachedResponse> {
        self.entries.iter().find(|e| e.key == *key).map(|e| &e.value)
    }

    fn insert(&mut self, key: CacheKey, value: CachedResponse) {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(existing) => existing.value = value,
            None => self.entries.push(StoredEntry { key, value }),
        }
    }
}

/// Buckets は作成順に並んだバケットの一覧
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Buckets(Vec<StoredBucket>);

impl Buckets {
    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|b| b.name == name)
    }

    fn bucket_mut(&mut self, name: &str) -> &mut StoredBucket {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                self.0.push(StoredBucket::new(name));
                self.0.len() - 1
            }
        };
        &mut self.0[idx]
    }

    /// Returns true if the bucket was created.
    pub(crate) fn open(&mut self, name: &str) -> bool {
        if self.position(name).is_some() {
            return false;
        }
        self.0.push(StoredBucket::new(name));
        true
    }

    pub(crate) fn match_in(&self, name: &str, key: &CacheKey) -> Option<CachedResponse> {
        if !key.is_storable() {
            return None;
        }
        let idx = self.position(name)?;
        self.0[idx].get(key).cloned()
    }

    pub(crate) fn match_any(&self, key: &CacheKey) -> Option<CachedResponse> {
        if !key.is_storable() {
            return None;
        }
        self.0.iter().find_map(|b| b.get(key)).cloned()
    }

    pub(crate) fn put(
        &mut self,
        name: &str,
        key: CacheKey,
        value: CachedResponse,
    ) -> Result<(), CacheError> {
        if !key.is_storable() {
            return Err(CacheError::UnsupportedMethod(key.method().clone()));
        }
        self.bucket_mut(name).insert(key, value);
        Ok(())
    }

    /// Validates the whole batch before touching the bucket.
    pub(crate) fn put_all(
        &mut self,
        name: &str,
        entries: Vec<(CacheKey, CachedResponse)>,
    ) -> Result<(), CacheError> {
        if let Some((key, _)) = entries.iter().find(|(key, _)| !key.is_storable()) {
            return Err(CacheError::UnsupportedMethod(key.method().clone()));
        }
        let bucket = self.bucket_mut(name);
        for (key, value) in entries {
            bucket.insert(key, value);
        }
        Ok(())
    }

    pub(crate) fn delete(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.0.iter().map(|b| b.name.clone()).collect()
    }

    pub(crate) fn entries(&self, name: &str) -> Vec<CacheKey> {
        self.position(name)
            .map(|idx| self.0[idx].entries.iter().map(|e| e.key.clone()).collect())
            .unwrap_or_default()
    }
}
