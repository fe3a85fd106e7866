//! Census walker - orchestrates the parallel directory walk
//!
//! The walker is responsible for:
//! - Opening the root (the only failure that aborts a walk)
//! - Starting the collector and the worker threads
//! - Waiting on the completion tracker
//! - Joining everything and returning the statistics table

use crate::config::CensusConfig;
use crate::error::{CensusError, Result, WorkerError};
use crate::stats::{Collector, ExtensionTable};
use crate::walker::queue::{DirTask, WorkTracker};
use crate::walker::worker::{log_outcome, scan_entries, VisitContext, WalkCounters, Worker};
use crossbeam_deque::{Injector, Stealer, Worker as DequeWorker};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Totals for a finished walk
#[derive(Debug, Clone, Default)]
pub struct WalkSummary {
    pub dirs: u64,
    pub files: u64,
    pub bytes: u64,
    pub errors: u64,
    pub skipped: u64,
    pub duration: Duration,
}

impl WalkSummary {
    fn from_counters(counters: &WalkCounters, duration: Duration) -> Self {
        Self {
            dirs: counters.dirs.load(Ordering::Relaxed),
            files: counters.files.load(Ordering::Relaxed),
            bytes: counters.bytes.load(Ordering::Relaxed),
            errors: counters.errors.load(Ordering::Relaxed),
            skipped: counters.skipped.load(Ordering::Relaxed),
            duration,
        }
    }
}

/// Result of a walk: the raw per-extension table plus totals
#[derive(Debug, Clone)]
pub struct Census {
    pub table: ExtensionTable,
    pub summary: WalkSummary,
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct WalkProgress {
    pub dirs: u64,
    pub files: u64,
    pub bytes: u64,
    pub errors: u64,
    /// Directory visits not yet finished
    pub pending: usize,
    pub elapsed: Duration,
}

impl WalkProgress {
    /// Calculate files per second rate
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.files as f64 / secs
        } else {
            0.0
        }
    }
}

/// Walks a directory tree and collects per-extension statistics
pub struct CensusWalker {
    config: Arc<CensusConfig>,
    tracker: Arc<WorkTracker>,
    counters: Arc<WalkCounters>,
}

impl CensusWalker {
    pub fn new(config: CensusConfig) -> Self {
        Self {
            config: Arc::new(config),
            tracker: WorkTracker::new(),
            counters: Arc::new(WalkCounters::default()),
        }
    }

    pub fn config(&self) -> &CensusConfig {
        &self.config
    }

    /// Snapshot of the walk so far
    pub fn progress(&self, elapsed: Duration) -> WalkProgress {
        WalkProgress {
            dirs: self.counters.dirs.load(Ordering::Relaxed),
            files: self.counters.files.load(Ordering::Relaxed),
            bytes: self.counters.bytes.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            pending: self.tracker.pending(),
            elapsed,
        }
    }

    /// Walk the configured root and block until every directory is visited
    pub fn run(&self) -> Result<Census> {
        let start = Instant::now();
        let root = self.config.root.clone();

        info!(
            root = %root.display(),
            threads = self.config.thread_count,
            max_depth = ?self.config.effective_max_depth(),
            "Starting census"
        );

        let metadata = fs::metadata(&root).map_err(|e| CensusError::RootUnreadable {
            path: root.clone(),
            source: e,
        })?;
        if !metadata.is_dir() {
            return Err(CensusError::NotADirectory { path: root });
        }

        let (collector, handle) = Collector::spawn()?;
        let ctx = VisitContext {
            config: Arc::clone(&self.config),
            tracker: Arc::clone(&self.tracker),
            collector: handle,
            counters: Arc::clone(&self.counters),
        };

        let injector: Arc<Injector<_>> = Arc::new(Injector::new());

        // The root is listed on this thread so its failure can be returned
        let root_task = self.tracker.schedule(root.clone(), 0);
        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) => {
                drop(root_task);
                drop(ctx);
                collector.finish()?;
                return Err(CensusError::RootUnreadable {
                    path: root,
                    source: e,
                });
            }
        };
        let outcome = scan_entries(&root_task, entries, &ctx, |task| injector.push(task));
        log_outcome(0, &outcome);
        drop(root_task);

        let workers = if self.tracker.is_complete() {
            Vec::new()
        } else {
            self.spawn_workers(&ctx, &injector)?
        };

        self.tracker.wait();

        let mut failure: Option<WorkerError> = None;
        for worker in workers {
            if let Err(e) = worker.join() {
                warn!(error = %e, "Worker failed to join cleanly");
                failure.get_or_insert(e);
            }
        }

        // Release our handle so the collector can finish
        drop(ctx);
        let table = collector.finish()?;

        if let Some(e) = failure {
            return Err(e.into());
        }

        let summary = WalkSummary::from_counters(&self.counters, start.elapsed());

        info!(
            dirs = summary.dirs,
            files = summary.files,
            bytes = summary.bytes,
            errors = summary.errors,
            extensions = table.len(),
            duration_ms = summary.duration.as_millis() as u64,
            "Census completed"
        );

        Ok(Census { table, summary })
    }

    /// Run the walk while reporting progress every 100ms from a helper thread
    pub fn run_with_progress<F>(&self, progress_callback: F) -> Result<Census>
    where
        F: Fn(WalkProgress) + Send + 'static,
    {
        let start = Instant::now();
        let finished = Arc::new(AtomicBool::new(false));

        let progress_handle = {
            let finished = Arc::clone(&finished);
            let tracker = Arc::clone(&self.tracker);
            let counters = Arc::clone(&self.counters);

            thread::spawn(move || {
                while !finished.load(Ordering::Relaxed) {
                    progress_callback(WalkProgress {
                        dirs: counters.dirs.load(Ordering::Relaxed),
                        files: counters.files.load(Ordering::Relaxed),
                        bytes: counters.bytes.load(Ordering::Relaxed),
                        errors: counters.errors.load(Ordering::Relaxed),
                        pending: tracker.pending(),
                        elapsed: start.elapsed(),
                    });
                    thread::sleep(Duration::from_millis(100));
                }
            })
        };

        let result = self.run();

        finished.store(true, Ordering::SeqCst);
        let _ = progress_handle.join();

        result
    }

    fn spawn_workers(
        &self,
        ctx: &VisitContext,
        injector: &Arc<Injector<DirTask>>,
    ) -> Result<Vec<Worker>> {
        let count = self.config.thread_count.max(1);

        let locals: Vec<DequeWorker<_>> = (0..count).map(|_| DequeWorker::new_fifo()).collect();
        let stealers: Arc<Vec<Stealer<_>>> = Arc::new(locals.iter().map(|w| w.stealer()).collect());

        let mut workers = Vec::with_capacity(count);
        for (id, local) in locals.into_iter().enumerate() {
            let worker = Worker::spawn(
                id,
                ctx.clone(),
                local,
                Arc::clone(injector),
                Arc::clone(&stealers),
            )?;
            workers.push(worker);
        }

        info!(count = workers.len(), "Workers spawned");
        Ok(workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_walk_progress_rate() {
        let progress = WalkProgress {
            files: 1000,
            elapsed: Duration::from_secs(10),
            ..Default::default()
        };
        assert!((progress.files_per_second() - 100.0).abs() < 0.1);
        assert_eq!(WalkProgress::default().files_per_second(), 0.0);
    }

    #[test]
    fn test_run_small_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        File::create(dir.path().join("top.rs")).unwrap();
        File::create(dir.path().join("a/mid.rs")).unwrap();
        File::create(dir.path().join("a/b/deep.toml")).unwrap();

        let walker = CensusWalker::new(CensusConfig::recursive(dir.path()));
        let census = walker.run().unwrap();

        assert_eq!(census.summary.dirs, 3);
        assert_eq!(census.summary.files, 3);
        assert_eq!(census.table.get("rs").map(|s| s.count), Some(2));
        assert_eq!(census.table.get("toml").map(|s| s.count), Some(1));
        assert!(walker.progress(Duration::ZERO).pending == 0);
    }

    #[test]
    fn test_root_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = CensusWalker::new(CensusConfig::recursive(dir.path().join("nope")));
        assert!(matches!(
            missing.run(),
            Err(CensusError::RootUnreadable { .. })
        ));

        let file = dir.path().join("plain.txt");
        File::create(&file).unwrap();
        let not_dir = CensusWalker::new(CensusConfig::recursive(&file));
        assert!(matches!(
            not_dir.run(),
            Err(CensusError::NotADirectory { .. })
        ));
    }
}
