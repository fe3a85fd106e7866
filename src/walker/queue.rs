//! Directory tasks and completion tracking
//!
//! Every directory visit is represented by a [`DirTask`]. Tasks are created
//! only through [`WorkTracker::schedule`], which bumps the pending counter
//! *before* the task exists, so the counter can never read zero while a
//! task is queued or being handed between threads.
//!
//! Each task carries a [`VisitGuard`]. Dropping the task (after its
//! directory has been scanned and its files handed to the collector)
//! decrements the counter exactly once. When the counter reaches zero the
//! whole subtree has been visited and waiters are woken.

use parking_lot::{Condvar, Mutex};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tracks outstanding directory visits
#[derive(Debug, Default)]
pub struct WorkTracker {
    /// Visits scheduled but not yet finished
    pending: AtomicUsize,

    /// Visits ever scheduled
    scheduled: AtomicU64,

    lock: Mutex<()>,
    idle: Condvar,
}

impl WorkTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new visit and return its task
    ///
    /// Must be called by the thread that discovered the directory, before
    /// the task is pushed anywhere other threads can see it.
    pub fn schedule(self: &Arc<Self>, path: PathBuf, depth: usize) -> DirTask {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.scheduled.fetch_add(1, Ordering::Relaxed);

        DirTask {
            path,
            depth,
            _guard: VisitGuard {
                tracker: Arc::clone(self),
            },
        }
    }

    fn finish_one(&self) {
        let previous = self.pending.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "visit finished twice");

        if previous == 1 {
            let _lock = self.lock.lock();
            self.idle.notify_all();
        }
    }

    /// Number of visits not yet finished
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Total number of visits scheduled so far
    pub fn scheduled(&self) -> u64 {
        self.scheduled.load(Ordering::Relaxed)
    }

    /// Check if no visit is outstanding
    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }

    /// Block until no visit is outstanding
    pub fn wait(&self) {
        let mut lock = self.lock.lock();
        while !self.is_complete() {
            self.idle.wait(&mut lock);
        }
    }

    /// Block until no visit is outstanding or the timeout elapses
    ///
    /// Returns true if the walk is complete.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut lock = self.lock.lock();
        if !self.is_complete() {
            let _ = self.idle.wait_for(&mut lock, timeout);
        }
        self.is_complete()
    }
}

/// Marks one visit as outstanding for as long as it lives
#[derive(Debug)]
pub struct VisitGuard {
    tracker: Arc<WorkTracker>,
}

impl Drop for VisitGuard {
    fn drop(&mut self) {
        self.tracker.finish_one();
    }
}

/// A directory waiting to be scanned
#[derive(Debug)]
pub struct DirTask {
    /// Full path to the directory
    pub path: PathBuf,

    /// Depth below the root (root = 0)
    pub depth: usize,

    _guard: VisitGuard,
}

impl DirTask {
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_tracker_counts() {
        let tracker = WorkTracker::new();
        assert!(tracker.is_complete());

        let root = tracker.schedule(PathBuf::from("/root"), 0);
        assert!(root.is_root());
        assert_eq!(tracker.pending(), 1);

        let child = tracker.schedule(PathBuf::from("/root/a"), 1);
        drop(root);
        assert!(!tracker.is_complete());

        drop(child);
        assert!(tracker.is_complete());
        assert_eq!(tracker.scheduled(), 2);
    }

    #[test]
    fn test_wait_returns_after_last_visit() {
        let tracker = WorkTracker::new();
        let root = tracker.schedule(PathBuf::from("/"), 0);

        let handle = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                // Fan out before finishing the parent, like a real visit
                let children: Vec<_> = (0..100)
                    .map(|i| tracker.schedule(PathBuf::from(format!("/{}", i)), 1))
                    .collect();
                drop(root);
                for child in children {
                    drop(child);
                }
            })
        };

        tracker.wait();
        assert!(tracker.is_complete());
        assert_eq!(tracker.scheduled(), 101);
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_timeout() {
        let tracker = WorkTracker::new();
        let task = tracker.schedule(PathBuf::from("/slow"), 0);
        assert!(!tracker.wait_timeout(Duration::from_millis(10)));
        drop(task);
        assert!(tracker.wait_timeout(Duration::from_millis(10)));
    }
}
