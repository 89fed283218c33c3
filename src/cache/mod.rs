use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::views::Rendered;

/// Cache of fully rendered responses, keyed by request identity
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn fetch(&self, key: &str) -> Option<Rendered>;

    async fn store(&self, key: &str, rendered: Rendered);

    /// Drop every entry whose key starts with `prefix`
    async fn expire(&self, prefix: &str);
}

/// Cache that never holds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn fetch(&self, _key: &str) -> Option<Rendered> {
        None
    }

    async fn store(&self, _key: &str, _rendered: Rendered) {}

    async fn expire(&self, _prefix: &str) {}
}

struct Entry {
    rendered: Rendered,
    stored_at: Instant,
}

/// In-process cache with a fixed time-to-live per entry
pub struct MemoryResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ResponseCache for MemoryResponseCache {
    async fn fetch(&self, key: &str) -> Option<Rendered> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    tracing::debug!("Response cache hit: {}", key);
                    return Some(entry.rendered.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Stale
        self.entries.write().await.remove(key);
        None
    }

    async fn store(&self, key: &str, rendered: Rendered) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                rendered,
                stored_at: Instant::now(),
            },
        );
    }

    async fn expire(&self, prefix: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let dropped = before - entries.len();
        if dropped > 0 {
            tracing::debug!("Expired {} cached response(s) under {}", dropped, prefix);
        }
    }
}
