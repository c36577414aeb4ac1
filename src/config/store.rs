//! Snapshot Store
//!
//! Holds the currently published [`ConfigSnapshot`] and rebuilds it lazily
//! once the reload interval has elapsed. Readers clone an `Arc` under a short
//! read lock; a reload swaps the `Arc` under the write lock. A reload that
//! fails keeps the previous snapshot.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::loader::RoutingLoader;
use super::snapshot::ConfigSnapshot;
use crate::types::Result;

struct Published {
    snapshot: Arc<ConfigSnapshot>,
    checked_at: Instant,
}

struct StoreInner {
    source: Option<PathBuf>,
    reload_enabled: bool,
    current: RwLock<Published>,
    reloading: AtomicBool,
}

/// Shared, cheaply clonable handle to the live configuration
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<StoreInner>,
}

impl SnapshotStore {
    /// Load the document at `path`. Configuration errors are returned to the
    /// caller, which treats them as fatal at startup.
    pub fn open(path: impl Into<PathBuf>, reload_enabled: bool) -> Result<Self> {
        let path = path.into();
        let snapshot = RoutingLoader::load(&path)?;
        Ok(Self::build(Some(path), reload_enabled, snapshot))
    }

    /// Static store around an already validated snapshot; never reloads
    pub fn from_snapshot(snapshot: ConfigSnapshot) -> Self {
        Self::build(None, false, snapshot)
    }

    fn build(source: Option<PathBuf>, reload_enabled: bool, snapshot: ConfigSnapshot) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                source,
                reload_enabled,
                current: RwLock::new(Published {
                    snapshot: Arc::new(snapshot),
                    checked_at: Instant::now(),
                }),
                reloading: AtomicBool::new(false),
            }),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.inner.source.as_deref()
    }

    /// Current snapshot, reloading first when the interval has elapsed
    pub fn current(&self) -> Arc<ConfigSnapshot> {
        if self.is_stale() {
            self.refresh_in_place();
        }
        self.published()
    }

    /// Force a reload now. On failure the previous snapshot stays published.
    pub fn reload(&self) -> Result<Arc<ConfigSnapshot>> {
        let Some(path) = self.inner.source.as_deref() else {
            return Ok(self.published());
        };
        let snapshot = Arc::new(RoutingLoader::load(path)?);
        self.publish(Arc::clone(&snapshot));
        info!(path = %path.display(), "Routing document reloaded");
        Ok(snapshot)
    }

    fn published(&self) -> Arc<ConfigSnapshot> {
        let guard = self
            .inner
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard.snapshot)
    }

    fn publish(&self, snapshot: Arc<ConfigSnapshot>) {
        let mut guard = self
            .inner
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.snapshot = snapshot;
        guard.checked_at = Instant::now();
    }

    /// Push the next reload attempt one interval further out
    fn touch(&self) {
        let mut guard = self
            .inner
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.checked_at = Instant::now();
    }

    fn is_stale(&self) -> bool {
        if !self.inner.reload_enabled || self.inner.source.is_none() {
            return false;
        }
        let guard = self
            .inner
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.checked_at.elapsed() >= guard.snapshot.selection.reload_interval
    }

    /// Rebuild the snapshot; a single caller at a time does the work and the
    /// others keep reading the previous snapshot.
    fn refresh_in_place(&self) {
        if self
            .inner
            .reloading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let Some(path) = self.inner.source.clone() else {
            self.inner.reloading.store(false, Ordering::Release);
            return;
        };

        debug!(path = %path.display(), "Reload interval elapsed");
        let outcome = match tokio::runtime::Handle::try_current() {
            Ok(handle)
                if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread =>
            {
                tokio::task::block_in_place(|| RoutingLoader::load(&path))
            }
            _ => RoutingLoader::load(&path),
        };

        match outcome {
            Ok(snapshot) => {
                self.publish(Arc::new(snapshot));
                info!(path = %path.display(), "Routing document reloaded");
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Reload failed, keeping previous configuration"
                );
                self.touch();
            }
        }
        self.inner.reloading.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("source", &self.inner.source)
            .field("reload_enabled", &self.inner.reload_enabled)
            .finish_non_exhaustive()
    }
}
