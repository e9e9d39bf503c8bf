use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::sleep;

/// Outcome of one rate-limit check, including the metadata the standard
/// `ratelimit-*` response headers are built from.
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_secs: u64,
}

/// Fixed-window counter for a single client key.
#[derive(Debug)]
struct FixedWindow {
    window_size: Duration,
    limit: u64,
    window_start: Instant,
    count: u64,
    last_seen: Instant,
}

impl FixedWindow {
    fn new(window_size: Duration, limit: u64) -> Self {
        let now = Instant::now();
        Self {
            window_size,
            limit,
            window_start: now,
            count: 0,
            last_seen: now,
        }
    }

    fn check(&mut self) -> RateLimitDecision {
        let now = Instant::now();
        self.last_seen = now;

        if now.duration_since(self.window_start) >= self.window_size {
            self.window_start = now;
            self.count = 0;
        }

        let reset_secs = self
            .window_size
            .saturating_sub(now.duration_since(self.window_start))
            .as_secs()
            .max(1);

        if self.count < self.limit {
            self.count += 1;
            RateLimitDecision {
                allowed: true,
                limit: self.limit,
                remaining: self.limit - self.count,
                reset_secs,
            }
        } else {
            RateLimitDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                reset_secs,
            }
        }
    }
}

/// --- Rate limiter store & eviction ---
type Key = String;

/// In-memory limiter keyed by client address. Counters stay consistent
/// under concurrent in-flight requests; idle entries are evicted by a
/// background task once their window has long passed. Single-instance
/// only: a multi-instance deployment would need a shared backing store.
#[derive(Clone)]
pub struct RateLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<FixedWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl RateLimiterStore {
    pub fn new(limit: u64, window_size: Duration) -> Self {
        let store = Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
        };

        // spawn eviction task
        {
            let map_clone = store.map.clone();
            let ttl = window_size * 2;
            tokio::spawn(async move {
                let interval = Duration::from_secs(60);
                loop {
                    sleep(interval).await;
                    let now = Instant::now();
                    let keys_to_remove: Vec<Key> = map_clone
                        .iter()
                        .filter_map(|entry| {
                            let window = entry.value().lock();
                            if now.duration_since(window.last_seen) > ttl {
                                Some(entry.key().clone())
                            } else {
                                None
                            }
                        })
                        .collect();

                    for k in keys_to_remove {
                        map_clone.remove(&k);
                    }
                }
            });
        }

        store
    }

    fn get_window(&self, key: &str) -> Arc<Mutex<FixedWindow>> {
        if let Some(existing) = self.map.get(key) {
            existing.clone()
        } else {
            let window = Arc::new(Mutex::new(FixedWindow::new(self.window_size, self.limit)));
            match self.map.entry(key.to_string()) {
                dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    entry.insert(window.clone());
                    window
                }
            }
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        let window = self.get_window(key);
        let mut w = window.lock();
        w.check()
    }
}
