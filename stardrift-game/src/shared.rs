//! Thread-safe wrapper for hosts that drive the engine from several threads.
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::catalog::CollectCatalog;
use crate::collect::{AutoCollectEngine, CollectError};
use crate::mode::CollectMode;
use crate::rewards::RewardBundle;
use crate::save::AutoCollectSave;

/// An [`AutoCollectEngine`] behind a single mutex.
///
/// Each operation holds the lock for its whole duration, so a timer tick and a
/// manual claim racing each other still settle every window exactly once.
#[derive(Debug)]
pub struct SharedCollector<C> {
    inner: Mutex<AutoCollectEngine<C>>,
}

impl<C: CollectCatalog> SharedCollector<C> {
    #[must_use]
    pub const fn new(engine: AutoCollectEngine<C>) -> Self {
        Self {
            inner: Mutex::new(engine),
        }
    }

    // Every operation leaves the engine consistent, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, AutoCollectEngine<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a session; see [`AutoCollectEngine::start`].
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidLocation`] if the id is not in the catalog.
    pub fn start(
        &self,
        location_id: &str,
        mode: CollectMode,
        now_ms: u64,
    ) -> Result<(), CollectError> {
        self.lock().start(location_id, mode, now_ms)
    }

    /// Stop the session; see [`AutoCollectEngine::stop`].
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::NotCollecting`] if no session is active.
    pub fn stop(&self, now_ms: u64) -> Result<RewardBundle, CollectError> {
        self.lock().stop(now_ms)
    }

    /// Claim without stopping; see [`AutoCollectEngine::claim`].
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::NotCollecting`] or [`CollectError::NothingToClaim`].
    pub fn claim(&self, now_ms: u64) -> Result<RewardBundle, CollectError> {
        self.lock().claim(now_ms)
    }

    pub fn settle(&self, now_ms: u64) -> bool {
        self.lock().settle(now_ms)
    }

    #[must_use]
    pub fn pending(&self, now_ms: u64) -> RewardBundle {
        self.lock().pending(now_ms)
    }

    #[must_use]
    pub fn query(&self) -> RewardBundle {
        self.lock().query()
    }

    pub fn snapshot(&self, now_ms: u64) -> AutoCollectSave {
        self.lock().snapshot(now_ms)
    }

    /// Run a closure against the engine while holding the lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut AutoCollectEngine<C>) -> R) -> R {
        f(&mut self.lock())
    }

    /// Consume the wrapper, returning the engine.
    #[must_use]
    pub fn into_inner(self) -> AutoCollectEngine<C> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
