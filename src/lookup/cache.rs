//! Persistent JSON cache of looked-up recordings

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Recordings keyed by `artist|title` (lowercased), stored as one JSON object
#[derive(Debug)]
pub struct LookupCache {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl LookupCache {
    /// Load the cache; a missing or unreadable file starts an empty cache
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Starting with an empty lookup cache: {:#}", e);
                BTreeMap::new()
            }
        };
        debug!("Loaded {} cached lookups from {}", entries.len(), path.display());
        Self { path, entries }
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, Value>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Case-insensitive key for an artist/title pair
    pub fn key(artist: &str, title: &str) -> String {
        format!("{}|{}", artist.to_lowercase(), title.to_lowercase())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, recording: Value) {
        self.entries.insert(key, recording);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole snapshot to a sibling temp file, then rename it into place
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&self.entries).context("Failed to serialize lookup cache")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_key_is_case_insensitive() {
        assert_eq!(LookupCache::key("Björk", "Jóga"), LookupCache::key("BJÖRK", "jóga"));
        assert_eq!(LookupCache::key("A", "B"), "a|b");
    }

    #[test]
    fn test_missing_file_gives_empty_cache() {
        let temp = TempDir::new().unwrap();
        let cache = LookupCache::load(temp.path().join("mb_cache.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_corrupt_file_gives_empty_cache() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mb_cache.json");
        std::fs::write(&path, "{not json").unwrap();
        let cache = LookupCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_persist_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mb_cache.json");

        let mut cache = LookupCache::load(&path);
        cache.insert(LookupCache::key("Sigur Rós", "Hoppípolla"), json!({"id": "x", "score": 100}));
        cache.persist().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        // Non-ASCII stays readable and the output is indented
        assert!(content.contains("sigur rós|hoppípolla"));
        assert!(content.contains("\n  "));
        assert!(!temp.path().join("mb_cache.json.tmp").exists());

        let reloaded = LookupCache::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("sigur rós|hoppípolla").unwrap()["id"], "x");
    }
}
