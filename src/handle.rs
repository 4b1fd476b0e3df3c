//! Scoped native handles.
//!
//! Every platform resource (device context, bitmap, window, pen...) is wrapped
//! in a [`NativeHandle`] as soon as it is acquired. The handle is released
//! exactly once: either explicitly through [`NativeHandle::release`] or when
//! the wrapper is dropped, on every exit path including early returns.
//!
//! [`HandleTracker`] counts outstanding handles so tests (and diagnostics) can
//! assert that a session leaves nothing behind.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::ResourceError;

type ReleaseFn<T> = Box<dyn FnOnce(T) -> Result<(), ResourceError>>;

// =============================================================================
// COMPTEUR DE HANDLES
// HANDLE TRACKER
// =============================================================================

#[derive(Debug, Default)]
struct Counters {
    outstanding: AtomicUsize,
    acquired: AtomicUsize,
}

/// Compteur partagé des handles natifs en vie
/// Shared counter of live native handles
#[derive(Clone, Debug, Default)]
pub struct HandleTracker {
    counters: Arc<Counters>,
}

impl HandleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.counters.outstanding.load(Ordering::SeqCst)
    }

    /// Handles acquired since the tracker was created.
    pub fn acquired_total(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    /// Prend possession d'un handle déjà acquis
    /// Takes ownership of an already acquired handle
    pub fn acquire<T, F>(&self, kind: &'static str, raw: T, release: F) -> NativeHandle<T>
    where
        T: Copy,
        F: FnOnce(T) -> Result<(), ResourceError> + 'static,
    {
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        self.counters.outstanding.fetch_add(1, Ordering::SeqCst);
        log::trace!("acquired {kind}");
        NativeHandle {
            raw,
            kind,
            release: Some(Box::new(release)),
            tracker: self.clone(),
        }
    }

    /// Acquiert via `acquire_fn`; `None` signifie un handle invalide
    /// Acquires through `acquire_fn`; `None` means an invalid handle
    pub fn try_acquire<T, A, F>(
        &self,
        kind: &'static str,
        acquire_fn: A,
        release: F,
    ) -> Result<NativeHandle<T>, ResourceError>
    where
        T: Copy,
        A: FnOnce() -> Option<T>,
        F: FnOnce(T) -> Result<(), ResourceError> + 'static,
    {
        match acquire_fn() {
            Some(raw) => Ok(self.acquire(kind, raw, release)),
            None => Err(ResourceError::Acquire { kind }),
        }
    }
}

// =============================================================================
// HANDLE NATIF
// NATIVE HANDLE
// =============================================================================

pub struct NativeHandle<T: Copy> {
    raw: T,
    kind: &'static str,
    release: Option<ReleaseFn<T>>,
    tracker: HandleTracker,
}

impl<T: Copy> NativeHandle<T> {
    /// Valeur brute, valide tant que `self` vit
    /// Raw value, valid while `self` is alive
    pub fn get(&self) -> T {
        self.raw
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Libère immédiatement et rapporte le résultat
    /// Releases right away and reports the outcome
    pub fn release(mut self) -> Result<(), ResourceError> {
        self.release_once()
    }

    /// Libère immédiatement; un échec est journalisé puis ignoré
    /// Releases right away; a failure is logged then ignored
    ///
    /// For teardown after the useful work is done, where a release error
    /// must not replace the result.
    pub fn release_or_log(self) {
        let kind = self.kind;
        if let Err(err) = self.release() {
            log::warn!("ignoring {kind} release failure: {err}");
        }
    }

    fn release_once(&mut self) -> Result<(), ResourceError> {
        match self.release.take() {
            Some(release) => {
                self.tracker
                    .counters
                    .outstanding
                    .fetch_sub(1, Ordering::SeqCst);
                log::trace!("released {}", self.kind);
                release(self.raw)
            }
            None => Ok(()),
        }
    }
}

impl<T: Copy> Drop for NativeHandle<T> {
    fn drop(&mut self) {
        if let Err(err) = self.release_once() {
            log::warn!("{err}");
        }
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("kind", &self.kind)
            .field("raw", &self.raw)
            .field("released", &self.release.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_drop_releases_once() {
        let tracker = HandleTracker::new();
        let calls = Rc::new(Cell::new(0));
        {
            let c = calls.clone();
            let _h = tracker.acquire("bitmap", 7u32, move |_| {
                c.set(c.get() + 1);
                Ok(())
            });
            assert_eq!(tracker.outstanding(), 1);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(tracker.outstanding(), 0);
        assert_eq!(tracker.acquired_total(), 1);
    }

    #[test]
    fn test_early_release_is_not_repeated_on_drop() {
        let tracker = HandleTracker::new();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let h = tracker.acquire("dc", 1u8, move |_| {
            c.set(c.get() + 1);
            Ok(())
        });
        assert!(h.release().is_ok());
        assert_eq!(calls.get(), 1);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_release_error_is_reported_and_counted() {
        let tracker = HandleTracker::new();
        let h = tracker.acquire("pen", 0u8, |_| {
            Err(ResourceError::Release {
                kind: "pen",
                detail: "busy".into(),
            })
        });
        assert!(matches!(h.release(), Err(ResourceError::Release { .. })));
        // Even a failed release is never retried
        // Une libération échouée n'est jamais retentée
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_release_or_log_swallows_failure() {
        let tracker = HandleTracker::new();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let h = tracker.acquire("screen DC", 3u8, move |_| {
            c.set(c.get() + 1);
            Err(ResourceError::Release {
                kind: "screen DC",
                detail: "ReleaseDC returned 0".into(),
            })
        });
        h.release_or_log();
        assert_eq!(calls.get(), 1);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_try_acquire_invalid() {
        let tracker = HandleTracker::new();
        let res = tracker.try_acquire("window", || None::<u32>, |_| Ok(()));
        assert!(matches!(res, Err(ResourceError::Acquire { kind: "window" })));
        assert_eq!(tracker.acquired_total(), 0);
    }
}
