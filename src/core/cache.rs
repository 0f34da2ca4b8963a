//! In-memory TTL cache for raw upstream responses.
//!
//! Expiry is checked on every read. A background task also rebuilds the map on a
//! fixed interval so entries that are never read again do not pile up.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

pub const DEFAULT_COMPACTION_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

type Entries = Arc<RwLock<HashMap<String, CacheEntry>>>;

pub struct TtlCache {
    entries: Entries,
    stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl TtlCache {
    /// Must be called inside a tokio runtime: the compaction task is spawned here.
    pub fn new() -> Self {
        Self::with_compaction_interval(DEFAULT_COMPACTION_INTERVAL)
    }

    pub fn with_compaction_interval(interval: Duration) -> Self {
        let entries: Entries = Arc::new(RwLock::new(HashMap::new()));
        let (stop_tx, stop_rx) = oneshot::channel();

        tokio::spawn(run_compaction(Arc::clone(&entries), interval, stop_rx));

        Self {
            entries,
            stop: Mutex::new(Some(stop_tx)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => Some(entry.value.clone()),
            _ => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: Vec<u8>, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.into(), entry);
    }

    /// Number of stored entries, expired ones included until the next compaction.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired entries now instead of waiting for the next tick.
    pub fn compact(&self) {
        compact(&self.entries);
    }

    /// Stop the compaction task. Later calls are no-ops.
    pub fn close(&self) {
        let sender = self
            .stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            // the task may already be gone if the runtime shut down
            let _ = sender.send(());
            tracing::debug!("Cache compaction stopped");
        }
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TtlCache {
    fn drop(&mut self) {
        self.close();
    }
}

fn compact(entries: &Entries) {
    let now = Instant::now();
    let mut guard = entries.write().unwrap_or_else(PoisonError::into_inner);
    let before = guard.len();
    let fresh: HashMap<String, CacheEntry> = guard
        .drain()
        .filter(|(_, entry)| !entry.is_expired(now))
        .collect();
    let removed = before - fresh.len();
    // replacing the map releases the old allocation
    *guard = fresh;
    drop(guard);

    if removed > 0 {
        tracing::debug!("Cache compaction removed {} expired entries", removed);
    }
}

async fn run_compaction(entries: Entries, interval: Duration, mut stop: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => compact(&entries),
            // fires on close() and when the sender is dropped
            _ = &mut stop => break,
        }
    }
}
