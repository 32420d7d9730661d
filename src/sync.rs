//! Synchronization primitives for search control.
//!
//! A [`SearchHandle`] is shared between the thread running a search and
//! any number of observers (UI, controller). It carries the cooperative
//! cancel flag, the pause gate, and the progress counters.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Lifecycle of a single search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl SearchStatus {
    fn to_u8(self) -> u8 {
        match self {
            SearchStatus::Idle => 0,
            SearchStatus::Running => 1,
            SearchStatus::Paused => 2,
            SearchStatus::Completed => 3,
            SearchStatus::Cancelled => 4,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => SearchStatus::Idle,
            1 => SearchStatus::Running,
            2 => SearchStatus::Paused,
            3 => SearchStatus::Completed,
            _ => SearchStatus::Cancelled,
        }
    }

    /// True once the search has returned, normally or not.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, SearchStatus::Completed | SearchStatus::Cancelled)
    }
}

#[derive(Default)]
struct PauseState {
    paused: bool,
    /// Node expansions granted by `step()` while paused
    steps: u32,
}

struct Shared {
    cancelled: AtomicBool,
    status: AtomicU8,
    nodes: AtomicU64,
    percent_done: AtomicU8,
    pause: Mutex<PauseState>,
    resumed: Condvar,
}

/// Thread-safe control and progress handle for one search.
#[derive(Clone)]
pub struct SearchHandle(Arc<Shared>);

impl SearchHandle {
    #[must_use]
    pub fn new() -> Self {
        SearchHandle(Arc::new(Shared {
            cancelled: AtomicBool::new(false),
            status: AtomicU8::new(SearchStatus::Idle.to_u8()),
            nodes: AtomicU64::new(0),
            percent_done: AtomicU8::new(0),
            pause: Mutex::new(PauseState::default()),
            resumed: Condvar::new(),
        }))
    }

    /// Request a pause. The search blocks at its next suspension point.
    pub fn pause(&self) {
        self.0.pause.lock().paused = true;
    }

    /// Resume a paused search.
    pub fn resume(&self) {
        let mut state = self.0.pause.lock();
        state.paused = false;
        state.steps = 0;
        self.0.resumed.notify_all();
    }

    /// Same as [`resume`](Self::resume).
    pub fn continue_processing(&self) {
        self.resume();
    }

    /// Let a paused search expand exactly one more node, then pause again.
    /// Pauses a running search first if needed.
    pub fn step(&self) {
        let mut state = self.0.pause.lock();
        state.paused = true;
        state.steps += 1;
        self.0.resumed.notify_all();
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.0.pause.lock().paused
    }

    /// Ask the search to unwind and return its best move so far.
    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::Relaxed);
        // Take the lock so a waiter cannot miss the wakeup
        let _state = self.0.pause.lock();
        self.0.resumed.notify_all();
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn status(&self) -> SearchStatus {
        let status = SearchStatus::from_u8(self.0.status.load(Ordering::Acquire));
        if status == SearchStatus::Running && self.is_paused() {
            SearchStatus::Paused
        } else {
            status
        }
    }

    /// Number of nodes expanded so far. Exact, not sampled.
    #[must_use]
    pub fn moves_considered(&self) -> u64 {
        self.0.nodes.load(Ordering::Relaxed)
    }

    /// Approximate share of the root moves searched so far, 0-100.
    #[must_use]
    pub fn percent_done(&self) -> u8 {
        self.0.percent_done.load(Ordering::Relaxed)
    }

    pub(crate) fn set_status(&self, status: SearchStatus) {
        self.0.status.store(status.to_u8(), Ordering::Release);
    }

    /// Count one expanded node and return the new total.
    #[inline]
    pub(crate) fn record_node(&self) -> u64 {
        self.0.nodes.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn set_percent_done(&self, percent: u8) {
        self.0.percent_done.store(percent.min(100), Ordering::Relaxed);
    }

    /// Block while paused. Returns immediately when running, when a step has
    /// been granted, or once the search is cancelled.
    pub(crate) fn wait_if_paused(&self) {
        let mut state = self.0.pause.lock();
        while state.paused && !self.is_cancelled() {
            if state.steps > 0 {
                state.steps -= 1;
                return;
            }
            self.0.resumed.wait(&mut state);
        }
    }
}

impl Default for SearchHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_cancel_lifecycle() {
        let handle = SearchHandle::new();
        assert!(!handle.is_cancelled());

        let observer = handle.clone();
        handle.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_status_reports_pause_while_running() {
        let handle = SearchHandle::new();
        assert_eq!(handle.status(), SearchStatus::Idle);

        handle.set_status(SearchStatus::Running);
        handle.pause();
        assert_eq!(handle.status(), SearchStatus::Paused);

        handle.resume();
        assert_eq!(handle.status(), SearchStatus::Running);

        handle.set_status(SearchStatus::Completed);
        assert!(handle.status().is_finished());
    }

    #[test]
    fn test_counters() {
        let handle = SearchHandle::new();
        assert_eq!(handle.record_node(), 1);
        assert_eq!(handle.record_node(), 2);
        assert_eq!(handle.moves_considered(), 2);

        handle.set_percent_done(250);
        assert_eq!(handle.percent_done(), 100);
    }

    #[test]
    fn test_resume_releases_waiter() {
        let handle = SearchHandle::new();
        handle.pause();

        let waiter = handle.clone();
        let worker = thread::spawn(move || waiter.wait_if_paused());

        thread::sleep(Duration::from_millis(20));
        assert!(!worker.is_finished());

        handle.resume();
        worker.join().unwrap();
    }

    #[test]
    fn test_step_grants_one_pass() {
        let handle = SearchHandle::new();
        handle.step();
        assert!(handle.is_paused());

        // The granted step lets exactly one wait through
        handle.wait_if_paused();
        assert!(handle.is_paused());

        let waiter = handle.clone();
        let worker = thread::spawn(move || waiter.wait_if_paused());
        thread::sleep(Duration::from_millis(20));
        assert!(!worker.is_finished());

        handle.cancel();
        worker.join().unwrap();
    }
}
