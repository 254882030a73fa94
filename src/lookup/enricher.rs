use serde_json::Value;
use tracing::{debug, info, warn};

use super::{extract, select_best, Enrichment, LookupCache, RecordingSource};

/// Cached recording lookups against an optional service.
///
/// Without a source only cached recordings are returned.
pub struct Enricher<S: RecordingSource> {
    source: Option<S>,
    cache: LookupCache,
    limit: usize,
}

impl<S: RecordingSource> Enricher<S> {
    pub fn new(source: Option<S>, cache: LookupCache, limit: usize) -> Self {
        Self {
            source,
            cache,
            limit,
        }
    }

    /// Best matching recording for an artist/title pair, consulting the cache first
    pub fn lookup(&mut self, artist: &str, title: &str) -> Option<Value> {
        let key = LookupCache::key(artist, title);
        if let Some(recording) = self.cache.get(&key) {
            info!("Lookup cache hit for {}", key);
            return Some(recording.clone());
        }

        let source = self.source.as_mut()?;
        let candidates = match source.search_recordings(artist, title, self.limit) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Recording search failed for {} - {}: {}", artist, title, e);
                return None;
            }
        };

        let Some(best) = select_best(candidates) else {
            debug!("No recordings found for {} - {}", artist, title);
            return None;
        };

        self.cache.insert(key, best.clone());
        self.persist();
        info!("Looked up and cached {} - {}", artist, title);
        Some(best)
    }

    /// Lookup reduced to the fields worth writing; empty when nothing matched
    pub fn enrich(&mut self, artist: &str, title: &str) -> Enrichment {
        self.lookup(artist, title)
            .map(|recording| extract(&recording))
            .unwrap_or_default()
    }

    /// Save the cache; failures are logged and otherwise ignored
    pub fn persist(&self) {
        if let Err(e) = self.cache.persist() {
            warn!("Failed to save lookup cache: {:#}", e);
        }
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }
}
