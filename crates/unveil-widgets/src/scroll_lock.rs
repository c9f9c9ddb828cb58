#![forbid(unsafe_code)]

//! Reference-counted document scroll lock.
//!
//! Nested modal surfaces each hold one reference. The document is locked
//! while at least one reference is outstanding, so an inner dialog closing
//! never unlocks scrolling under an outer dialog that is still open.
//!
//! # Invariants
//!
//! - The count never goes negative; [`release`] at zero is a no-op.
//! - The host is written only on the 0→1 and 1→0 transitions.
//! - The count is per UI thread (the engine is single-threaded).
//!
//! Controllers hold a [`ScrollLockGuard`], which releases on drop. That pairs
//! every acquire with exactly one release even when a widget is dropped while
//! still open.

use std::cell::Cell;
use std::rc::Rc;

use crate::host::Host;

thread_local! {
    static LOCKS: Cell<usize> = const { Cell::new(0) };
}

/// Take one reference. Locks the document on the first reference.
///
/// Returns the new count.
pub fn acquire(host: &dyn Host) -> usize {
    let locks = LOCKS.with(|l| {
        let next = l.get() + 1;
        l.set(next);
        next
    });
    if locks == 1 {
        host.set_scroll_locked(true);
        tracing::debug!(locks, "document scroll locked");
    } else {
        tracing::trace!(locks, "scroll lock reference added");
    }
    locks
}

/// Drop one reference, floored at zero. Unlocks on the last reference.
///
/// Returns the new count.
pub fn release(host: &dyn Host) -> usize {
    let Some(previous) = LOCKS.try_with(Cell::get).ok() else {
        return 0;
    };
    if previous == 0 {
        tracing::trace!("scroll lock release ignored at zero");
        return 0;
    }
    let locks = previous - 1;
    LOCKS.with(|l| l.set(locks));
    if locks == 0 {
        host.set_scroll_locked(false);
        tracing::debug!("document scroll unlocked");
    }
    locks
}

/// Outstanding references on this thread.
pub fn lock_count() -> usize {
    LOCKS.with(Cell::get)
}

/// Whether the document is currently locked.
pub fn is_locked() -> bool {
    lock_count() > 0
}

/// One scroll-lock reference, released when dropped.
#[must_use = "dropping the guard releases the scroll lock immediately"]
pub struct ScrollLockGuard {
    host: Rc<dyn Host>,
}

impl ScrollLockGuard {
    /// Acquire a reference on behalf of `host`.
    pub fn acquire(host: Rc<dyn Host>) -> Self {
        acquire(&*host);
        Self { host }
    }

    /// Release now. Equivalent to dropping the guard.
    pub fn release(self) {
        drop(self);
    }
}

impl std::fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLockGuard").finish_non_exhaustive()
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        release(&*self.host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    #[test]
    fn first_acquire_locks_last_release_unlocks() {
        let host = RecordingHost::new(800, 600);
        assert_eq!(acquire(&host), 1);
        assert!(host.is_scroll_locked());
        assert_eq!(acquire(&host), 2);
        assert_eq!(release(&host), 1);
        assert!(host.is_scroll_locked());
        assert_eq!(release(&host), 0);
        assert!(!host.is_scroll_locked());
        assert_eq!(host.scroll_lock_writes(), 2);
    }

    #[test]
    fn release_at_zero_is_noop() {
        let host = RecordingHost::new(800, 600);
        assert_eq!(release(&host), 0);
        assert_eq!(release(&host), 0);
        assert_eq!(lock_count(), 0);
        assert_eq!(host.scroll_lock_writes(), 0);
        // A later acquire still locks normally.
        acquire(&host);
        assert!(is_locked());
        release(&host);
    }

    #[test]
    fn guard_releases_on_drop() {
        let host = Rc::new(RecordingHost::new(800, 600));
        let outer = ScrollLockGuard::acquire(host.clone());
        let inner = ScrollLockGuard::acquire(host.clone());
        assert_eq!(lock_count(), 2);
        drop(inner);
        assert!(host.is_scroll_locked());
        outer.release();
        assert!(!host.is_scroll_locked());
        assert_eq!(lock_count(), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn locked_iff_acquires_exceed_releases(ops in prop::collection::vec(any::<bool>(), 0..64)) {
                let host = RecordingHost::new(800, 600);
                let start = lock_count();
                let mut expected: usize = 0;
                for acquire_op in ops {
                    if acquire_op {
                        acquire(&host);
                        expected += 1;
                    } else {
                        release(&host);
                        expected = expected.saturating_sub(1);
                    }
                    prop_assert_eq!(lock_count(), start + expected);
                    prop_assert_eq!(host.is_scroll_locked(), expected > 0);
                }
                while lock_count() > start {
                    release(&host);
                }
            }
        }
    }
}
