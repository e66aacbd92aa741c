//! # burrow-session
//!
//! In-memory session store keyed by the session cookie's UUID. Each entry
//! holds one [`GameSession`] behind its own `RwLock`; entries expire after
//! `ttl_seconds` of inactivity and a background sweeper reclaims them.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use burrow_plugin::GameSession;

struct SessionEntry {
    game: Arc<RwLock<GameSession>>,
    touched: AtomicI64,
}

impl SessionEntry {
    fn expired(&self, now: i64, ttl_seconds: i64) -> bool {
        now - self.touched.load(Ordering::Relaxed) > ttl_seconds
    }
}

/// Process-wide session store.
///
/// Expiry is checked on access as well as by the sweeper, so a stale entry
/// is never handed out even between sweeps.
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<SessionEntry>>,
    ttl_seconds: i64,
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_seconds: ttl_seconds as i64,
        }
    }

    /// Looks up a live session, refreshing its idle timer.
    pub fn get(&self, id: Uuid) -> Option<Arc<RwLock<GameSession>>> {
        let now = Utc::now().timestamp();
        let entry = match self.sessions.get(&id) {
            Some(entry) => {
                if entry.expired(now, self.ttl_seconds) {
                    // Drop the map guard before removing to avoid holding
                    // the shard lock across the removal.
                    drop(entry);
                    self.sessions.remove(&id);
                    debug!(session = %id, "session expired on access");
                    return None;
                }
                Arc::clone(entry.value())
            }
            None => return None,
        };
        entry.touched.store(now, Ordering::Relaxed);
        Some(Arc::clone(&entry.game))
    }

    /// Stores a session under `id`, replacing any previous one.
    pub fn insert(&self, id: Uuid, game: GameSession) -> Arc<RwLock<GameSession>> {
        let game = Arc::new(RwLock::new(game));
        let entry = Arc::new(SessionEntry {
            game: Arc::clone(&game),
            touched: AtomicI64::new(Utc::now().timestamp()),
        });
        self.sessions.insert(id, entry);
        game
    }

    /// Drops the session. Returns whether one existed.
    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Removes every expired entry. Returns how many were reclaimed.
    pub fn sweep(&self) -> usize {
        let now = Utc::now().timestamp();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !entry.expired(now, self.ttl_seconds));
        before - self.sessions.len()
    }
}

/// Runs [`SessionStore::sweep`] every `interval` until shutdown is signalled.
pub fn spawn_sweeper(
    store: Arc<SessionStore>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reclaimed = store.sweep();
                    if reclaimed > 0 {
                        debug!(reclaimed, remaining = store.len(), "swept expired sessions");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("session sweeper shutting down");
                        break;
                    }
                }
            }
        }
    })
}
