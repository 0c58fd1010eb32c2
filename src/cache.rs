//! Enumeration cache
//!
//! Remembers the metric names and dimension keys seen in a (region, namespace)
//! so repeated variable refreshes do not re-enumerate the whole namespace.
//! Entries expire after a fixed freshness window and are then replaced
//! wholesale; there is no size bound and no other eviction.

use crate::inventory::CapabilityResult;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Default freshness window (5 minutes)
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// What a cached set enumerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumerationKind {
    Metrics,
    Dimensions,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    region: String,
    namespace: String,
    kind: EnumerationKind,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    names: BTreeSet<String>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, window: Duration) -> bool {
        self.fetched_at.elapsed() < window
    }
}

/// Slot holding at most one entry; its lock serializes fetches for one key
type Slot = Arc<tokio::sync::Mutex<Option<CacheEntry>>>;

pub struct EnumerationCache {
    freshness: Duration,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl EnumerationCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            freshness,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: CacheKey) -> Slot {
        // The map only ever gains slots, so a poisoned guard is still consistent
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key).or_default().clone()
    }

    /// Return the cached set for the key, or run `fetch` and store its result.
    ///
    /// A failed fetch writes nothing and is returned as is; an expired entry
    /// is never served in its place.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        region: &str,
        namespace: &str,
        kind: EnumerationKind,
        fetch: F,
    ) -> CapabilityResult<BTreeSet<String>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CapabilityResult<BTreeSet<String>>>,
    {
        let slot = self.slot(CacheKey {
            region: region.to_string(),
            namespace: namespace.to_string(),
            kind,
        });

        let mut entry = slot.lock().await;
        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(self.freshness) {
                tracing::debug!("Cache hit: {}/{} {:?}", region, namespace, kind);
                return Ok(cached.names.clone());
            }
            tracing::debug!("Cache entry expired: {}/{} {:?}", region, namespace, kind);
        }

        let names = fetch().await?;
        tracing::debug!(
            "Cached {} {:?} names for {}/{}",
            names.len(),
            kind,
            region,
            namespace
        );
        *entry = Some(CacheEntry {
            names: names.clone(),
            fetched_at: Instant::now(),
        });

        Ok(names)
    }
}

impl Default for EnumerationCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}
