//! Transport cache store.
//!
//! Remembers, separately for encrypted and unencrypted connections, which
//! transport connected last and how long it took. The store is owned by a
//! built strategy tree (or injected into the builder) and can be exported as
//! JSON for persistence across processes:
//!
//! ```json
//! {
//!   "tls": { "timestamp": 1760000000000, "transport": "ws", "latency": 120 },
//!   "nonTls": null
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;

// ============================================================================
// CacheRecord
// ============================================================================

/// Last successful transport for one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Milliseconds since the Unix epoch when the record was written.
    pub timestamp: u64,
    /// Transport definition name.
    pub transport: String,
    /// Milliseconds the connection took.
    pub latency: u64,
}

impl CacheRecord {
    /// Returns `true` if the record is at most `ttl` old at `now_ms`.
    #[inline]
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration, now_ms: u64) -> bool {
        self.timestamp.saturating_add(ttl.as_millis() as u64) >= now_ms
    }

    /// Returns the recorded latency.
    #[inline]
    #[must_use]
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency)
    }
}

// ============================================================================
// TransportCache
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Partitions {
    tls: Option<CacheRecord>,
    non_tls: Option<CacheRecord>,
}

impl Partitions {
    fn slot(&mut self, encrypted: bool) -> &mut Option<CacheRecord> {
        if encrypted { &mut self.tls } else { &mut self.non_tls }
    }
}

/// Shared cache of last successful transports, keyed by encryption.
#[derive(Debug, Default)]
pub struct TransportCache {
    partitions: Mutex<Partitions>,
}

impl TransportCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for a partition.
    #[must_use]
    pub fn fetch(&self, encrypted: bool) -> Option<CacheRecord> {
        self.partitions.lock().slot(encrypted).clone()
    }

    /// Writes a record stamped with the current time.
    pub fn store(&self, encrypted: bool, transport: impl Into<String>, latency: Duration) {
        let record = CacheRecord {
            timestamp: now_millis(),
            transport: transport.into(),
            latency: latency.as_millis() as u64,
        };
        self.store_record(encrypted, record);
    }

    /// Writes a record as given.
    pub fn store_record(&self, encrypted: bool, record: CacheRecord) {
        trace!(encrypted, transport = %record.transport, latency_ms = record.latency, "Transport cached");
        *self.partitions.lock().slot(encrypted) = Some(record);
    }

    /// Removes the record for a partition.
    pub fn flush(&self, encrypted: bool) {
        if self.partitions.lock().slot(encrypted).take().is_some() {
            trace!(encrypted, "Transport cache flushed");
        }
    }

    /// Serializes both partitions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let partitions = self.partitions.lock().clone();
        Ok(serde_json::to_string(&partitions)?)
    }

    /// Restores a cache from [`TransportCache::to_json`] output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the text is malformed.
    pub fn from_json(text: &str) -> Result<Self> {
        let partitions: Partitions = serde_json::from_str(text)?;
        Ok(Self {
            partitions: Mutex::new(partitions),
        })
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitions_are_separate() {
        let cache = TransportCache::new();
        cache.store(true, "wss", Duration::from_millis(40));

        assert_eq!(cache.fetch(true).expect("tls record").transport, "wss");
        assert!(cache.fetch(false).is_none());
    }

    #[test]
    fn test_flush() {
        let cache = TransportCache::new();
        cache.store(false, "ws", Duration::from_millis(40));
        cache.flush(false);
        assert!(cache.fetch(false).is_none());
    }

    #[test]
    fn test_freshness() {
        let record = CacheRecord {
            timestamp: 1_000,
            transport: "ws".into(),
            latency: 10,
        };
        assert!(record.is_fresh(Duration::from_millis(500), 1_500));
        assert!(!record.is_fresh(Duration::from_millis(500), 1_501));
    }

    #[test]
    fn test_json_round_trip() {
        let cache = TransportCache::new();
        cache.store(true, "wss", Duration::from_millis(75));

        let json = cache.to_json().expect("serialize");
        assert!(json.contains(r#""nonTls":null"#));

        let restored = TransportCache::from_json(&json).expect("restore");
        assert_eq!(restored.fetch(true), cache.fetch(true));
        assert!(restored.fetch(false).is_none());
    }
}
