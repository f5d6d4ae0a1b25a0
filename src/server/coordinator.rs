//! Indexing lifecycle state machine shared by every client session.

use std::sync::atomic::{AtomicU8, Ordering};

const NOT_BUILT: u8 = 0;
const BUILDING: u8 = 1;
const READY: u8 = 2;

/// Observable indexing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    NotBuilt,
    Building,
    Ready,
}

/// Guards the single index build.
///
/// Transitions: NotBuilt -> Building (one winner via compare-and-set),
/// Building -> Ready (build driver, success), Building -> NotBuilt (build
/// driver, failure or invalid worker count). Ready is terminal; there is no
/// re-indexing within one process lifetime.
///
/// The release stores pair with the acquire load in [`state`]: a session
/// that observes `Ready` also sees every index write made during the build.
///
/// [`state`]: IndexingCoordinator::state
pub struct IndexingCoordinator {
    state: AtomicU8,
}

impl IndexingCoordinator {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(NOT_BUILT),
        }
    }

    pub fn state(&self) -> IndexState {
        match self.state.load(Ordering::Acquire) {
            NOT_BUILT => IndexState::NotBuilt,
            BUILDING => IndexState::Building,
            _ => IndexState::Ready,
        }
    }

    /// Claim the build. Exactly one session wins the NotBuilt -> Building
    /// transition and becomes the build driver; everyone else gets `false`.
    pub fn try_begin_build(&self) -> bool {
        self.state
            .compare_exchange(NOT_BUILT, BUILDING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Publish a successful build. Build driver only.
    pub fn mark_ready(&self) {
        self.state.store(READY, Ordering::Release);
    }

    /// Give the build slot back so a later session can retry. Build driver
    /// only; the driver must discard partial index content first.
    pub fn abandon_build(&self) {
        self.state.store(NOT_BUILT, Ordering::Release);
    }
}

impl Default for IndexingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn starts_not_built() {
        let coordinator = IndexingCoordinator::new();
        assert_eq!(coordinator.state(), IndexState::NotBuilt);
    }

    #[test]
    fn successful_build_lifecycle() {
        let coordinator = IndexingCoordinator::new();
        assert!(coordinator.try_begin_build());
        assert_eq!(coordinator.state(), IndexState::Building);
        // Further claims lose while the build runs.
        assert!(!coordinator.try_begin_build());
        coordinator.mark_ready();
        assert_eq!(coordinator.state(), IndexState::Ready);
        // Ready is terminal.
        assert!(!coordinator.try_begin_build());
    }

    #[test]
    fn abandoned_build_is_retryable() {
        let coordinator = IndexingCoordinator::new();
        assert!(coordinator.try_begin_build());
        coordinator.abandon_build();
        assert_eq!(coordinator.state(), IndexState::NotBuilt);
        assert!(coordinator.try_begin_build());
    }

    #[test]
    fn exactly_one_winner_under_contention() {
        let coordinator = IndexingCoordinator::new();
        let wins = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    if coordinator.try_begin_build() {
                        wins.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        assert_eq!(wins.load(Ordering::Relaxed), 1);
        assert_eq!(coordinator.state(), IndexState::Building);
    }
}
