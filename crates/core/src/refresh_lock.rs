//! Advisory, self-expiring lock for cross-session token refresh
//!
//! The lock is one storage entry holding its absolute expiry in epoch
//! milliseconds. Acquisition is read-then-write: the backend has no
//! compare-and-swap, so two sessions racing between the read and the write
//! can both acquire. Refresh-token rotation keeps the last writer's token set,
//! and the critical section is a single round trip.

use std::sync::Arc;
use std::time::Duration;

use tabauth_common::time::Clock;
use tabauth_domain::constants::LOCK_POLL_INTERVAL_MS;
use tabauth_domain::Result;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::ports::KeyValueStorage;

/// Coordinates refreshes between sessions sharing one storage backend
#[derive(Clone)]
pub struct RefreshCoordinator {
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl RefreshCoordinator {
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock, poll_interval: Duration::from_millis(LOCK_POLL_INTERVAL_MS) }
    }

    /// Try to take the lock for `ttl_ms` milliseconds
    ///
    /// Returns `false` when another holder's entry is still live. A missing,
    /// unparseable or expired entry is overwritten.
    ///
    /// # Errors
    /// Returns the backend error if the read or write fails
    pub fn acquire(&self, key: &str, ttl_ms: u64) -> Result<bool> {
        let now = self.clock.now_millis();
        if let Some(expires_at) = self.read_expiry(key)? {
            if expires_at > now {
                debug!(lock = %key, expires_in_ms = expires_at - now, "refresh_lock.held");
                return Ok(false);
            }
        }

        let ttl = i64::try_from(ttl_ms).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl);
        self.storage.set(key, &expires_at.to_string())?;
        debug!(lock = %key, ttl_ms, "refresh_lock.acquired");
        Ok(true)
    }

    /// Remove the lock unconditionally
    ///
    /// # Errors
    /// Returns the backend error if the removal fails
    pub fn release(&self, key: &str) -> Result<()> {
        self.storage.remove(key)?;
        debug!(lock = %key, "refresh_lock.released");
        Ok(())
    }

    /// Poll until the lock is gone, observed expired, or `timeout` elapses
    ///
    /// An entry observed past its expiry is removed. Timing out is not an
    /// error; the caller re-reads whatever state exists afterwards.
    pub async fn wait_for_release(&self, key: &str, timeout: Duration) {
        let started = Instant::now();
        loop {
            match self.read_expiry(key) {
                Ok(None) => {
                    debug!(lock = %key, "refresh_lock.wait_released");
                    return;
                }
                Ok(Some(expires_at)) if expires_at <= self.clock.now_millis() => {
                    if let Err(e) = self.storage.remove(key) {
                        warn!(lock = %key, error = %e, "refresh_lock.reclaim_failed");
                    }
                    debug!(lock = %key, "refresh_lock.wait_reclaimed");
                    return;
                }
                Ok(Some(_)) => {}
                Err(e) => warn!(lock = %key, error = %e, "refresh_lock.read_failed"),
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                warn!(lock = %key, waited_ms = elapsed.as_millis() as u64, "refresh_lock.wait_timeout");
                return;
            }
            tokio::time::sleep(self.poll_interval.min(timeout - elapsed)).await;
        }
    }

    /// Parsed expiry of the current entry; garbage reads as expired
    fn read_expiry(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.storage.get(key)?.map(|raw| raw.trim().parse::<i64>().unwrap_or(i64::MIN)))
    }
}
