//! One-shot release of a platform-held resource.
//!
//! Stream drop, supersession, and normal terminal completion all funnel
//! through the same guard, so the underlying broker resource is released
//! exactly once no matter how those race.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// The deferred broker call that frees the platform resource.
pub(crate) type ReleaseAction =
    std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'static>>;

pub(crate) struct ReleaseGuard {
    released: AtomicBool,
    action: Mutex<Option<ReleaseAction>>,
}

impl ReleaseGuard {
    pub(crate) fn new(action: ReleaseAction) -> Self {
        ReleaseGuard {
            released: AtomicBool::new(false),
            action: Mutex::new(Some(action)),
        }
    }

    /// Fire the release action if nobody has yet. Returns `true` when
    /// this call won the race; the winner is also the only party allowed
    /// to emit a terminal value.
    pub(crate) fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        let action = match self.action.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(action) = action else {
            return true;
        };
        // Drop can run outside a runtime; with no runtime alive there is
        // no broker task alive either, so skipping is safe.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(action);
            }
            Err(_) => {
                debug!("no runtime available for resource release; skipping");
            }
        }
        true
    }

    /// Like [`release`](Self::release) but awaits the action inline, so
    /// the caller observes the broker-side release before proceeding.
    /// Used when superseding a registration: the old one must be gone
    /// before the replacement is registered.
    pub(crate) async fn release_now(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        let action = match self.action.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(action) = action {
            action.await;
        }
        true
    }

    pub(crate) fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ReleaseGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseGuard")
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
