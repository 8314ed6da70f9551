//! Per-user serialization of authentication-state transitions

use crate::utils::validation::normalize;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Entries kept before idle locks are pruned
const PRUNE_THRESHOLD: usize = 1_024;

/// One async mutex per `(context, user)`.
///
/// Holders re-read the user from the directory after acquiring, so counters
/// and lock state are never updated from a stale copy.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: DashMap<(String, String), Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, context_id: &str, user_id: &str) -> OwnedMutexGuard<()> {
        if self.locks.len() > PRUNE_THRESHOLD {
            // Only this map holds an idle entry's Arc
            self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }

        let lock = self
            .locks
            .entry((context_id.to_string(), normalize(user_id)))
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}
