//! Analysis Cache
//!
//! Thread-safe cache untuk hasil analisis token, keyed by lowercase address
//! plus a fingerprint of the request inputs (token snapshot + payloads), so a
//! request carrying different provider data is never served a stale result.
//! DashMap untuk concurrent access tanpa lock contention.
//!
//! - TTL-based expiration (`RUGSCOPE_CACHE_TTL_SECS`, 5 menit default)
//! - Fallback results are never stored
//! - HIT/MISS counters for `/v1/stats`

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::models::AnalysisResult;
use crate::utils::constants::DEFAULT_CACHE_TTL_SECS;

#[derive(Clone, Debug)]
struct CacheEntry {
    result: AnalysisResult,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }

    fn remaining(&self, ttl: Duration) -> u64 {
        ttl.saturating_sub(self.created_at.elapsed()).as_secs()
    }
}

#[derive(Clone, Debug)]
pub struct AnalysisCache {
    store: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL_SECS)
    }
}

impl AnalysisCache {
    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn prefix(address: &str) -> String {
        format!("{}:", address.trim().to_lowercase())
    }

    #[inline]
    fn key(address: &str, fingerprint: &str) -> String {
        format!("{}{}", Self::prefix(address), fingerprint)
    }

    /// Cached result for this address and input fingerprint, if fresh
    pub fn get(&self, address: &str, fingerprint: &str) -> Option<AnalysisResult> {
        let key = Self::key(address, fingerprint);

        let Some(entry) = self.store.get(&key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS: {}", key);
            return None;
        };

        if entry.is_expired(self.ttl) {
            drop(entry); // release read guard before remove
            self.store.remove(&key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS (expired): {}", key);
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        info!("✅ CACHE HIT: {} (TTL: {}s remaining)", key, entry.remaining(self.ttl));
        Some(entry.result.clone())
    }

    /// Store a result under its input fingerprint; fallback results are skipped
    pub fn set(&self, fingerprint: &str, result: &AnalysisResult) {
        if result.is_fallback() {
            debug!("⏭️ CACHE SKIP (fallback): {}", result.token_address);
            return;
        }
        let key = Self::key(&result.token_address, fingerprint);
        self.store.insert(
            key.clone(),
            CacheEntry {
                result: result.clone(),
                created_at: Instant::now(),
            },
        );
        debug!("💾 CACHE SET: {} (TTL: {}s)", key, self.ttl.as_secs());
    }

    /// Drop every entry for an address, whatever its fingerprint
    pub fn invalidate(&self, address: &str) {
        let prefix = Self::prefix(address);
        self.store.retain(|key, _| !key.starts_with(&prefix));
    }

    /// Drop expired entries, returning how many went
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        let ttl = self.ttl;
        self.store.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before - self.store.len();
        if removed > 0 {
            info!("🧹 CACHE CLEANUP: {} expired entries removed", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::fallback_result;
    use crate::models::{ScoreSource, TokenData};

    fn result(address: &str) -> AnalysisResult {
        let mut r = fallback_result(address, &TokenData::default());
        r.source = ScoreSource::Heuristic;
        r
    }

    #[test]
    fn test_address_normalization() {
        let cache = AnalysisCache::default();
        cache.set("fp", &result("0xDAC17F958D2EE523A2206206994597C13D831EC7"));
        assert!(cache.get("0xdac17f958d2ee523a2206206994597c13d831ec7", "fp").is_some());
    }

    #[test]
    fn test_fingerprint_separates_entries() {
        let cache = AnalysisCache::default();
        cache.set("first", &result("0xabc"));
        assert!(cache.get("0xabc", "first").is_some());
        assert!(cache.get("0xabc", "second").is_none());

        cache.set("second", &result("0xabc"));
        assert_eq!(cache.stats().entries, 2);
        cache.invalidate("0xABC");
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_fallback_not_cached() {
        let cache = AnalysisCache::default();
        cache.set("fp", &fallback_result("0xabc", &TokenData::default()));
        assert!(cache.get("0xabc", "fp").is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = AnalysisCache::with_ttl(0);
        cache.set("fp", &result("0xabc"));
        assert!(cache.get("0xabc", "fp").is_none());
        assert_eq!(cache.cleanup_expired(), 0);
    }

    #[test]
    fn test_cache_stats() {
        let cache = AnalysisCache::default();
        cache.set("fp", &result("0xtest"));
        cache.get("0xtest", "fp");
        cache.get("0xnonexistent", "fp");

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 50.0);

        cache.invalidate("0xTEST");
        assert_eq!(cache.stats().entries, 0);
    }
}
