//! Worker thread logic for parallel directory walking
//!
//! Each worker:
//! - Pops directory tasks from its own deque, the shared injector, or
//!   steals from its siblings
//! - Lists the directory and applies the admission filter to each entry
//! - Schedules admitted subdirectories on its local deque
//! - Sends the directory's files to the collector as one batch
//!
//! Workers exit once the tracker reports that no visit is outstanding.

use crate::config::CensusConfig;
use crate::error::{VisitOutcome, WorkerError};
use crate::stats::{CollectorHandle, FileRecord};
use crate::walker::queue::{DirTask, WorkTracker};
use crossbeam_deque::{Injector, Stealer, Worker as DequeWorker};
use std::fs::{self, DirEntry, ReadDir};
use std::iter;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Idle polls before a worker starts sleeping between polls
const MAX_IDLE_SPINS: u32 = 64;

/// Counters shared by every worker
#[derive(Debug, Default)]
pub struct WalkCounters {
    /// Directories listed
    pub dirs: AtomicU64,

    /// Files handed to the collector
    pub files: AtomicU64,

    /// Bytes in those files
    pub bytes: AtomicU64,

    /// Directories or entries that failed for reasons other than permissions
    pub errors: AtomicU64,

    /// Directories skipped (permission denied) and excluded entries
    pub skipped: AtomicU64,
}

impl WalkCounters {
    pub(crate) fn record_dir(&self) {
        self.dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_files(&self, count: u64, bytes: u64) {
        self.files.fetch_add(count, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Everything a directory visit needs
#[derive(Clone)]
pub struct VisitContext {
    pub config: Arc<CensusConfig>,
    pub tracker: Arc<WorkTracker>,
    pub collector: CollectorHandle,
    pub counters: Arc<WalkCounters>,
}

/// What a directory entry resolved to
enum EntryKind {
    Directory,
    File(FileRecord),
}

/// A traversal worker thread
pub struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        ctx: VisitContext,
        local: DequeWorker<DirTask>,
        injector: Arc<Injector<DirTask>>,
        stealers: Arc<Vec<Stealer<DirTask>>>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("walker-{}", id))
            .spawn(move || worker_loop(id, ctx, local, injector, stealers))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::Panicked {
                id: self.id,
                message: "Worker thread panicked".into(),
            }),
            None => Ok(()),
        }
    }
}

fn worker_loop(
    id: usize,
    ctx: VisitContext,
    local: DequeWorker<DirTask>,
    injector: Arc<Injector<DirTask>>,
    stealers: Arc<Vec<Stealer<DirTask>>>,
) {
    debug!(worker = id, "Worker started");

    let mut visited = 0u64;
    let mut idle_spins = 0u32;

    loop {
        let task = match find_task(&local, &injector, &stealers) {
            Some(task) => {
                idle_spins = 0;
                task
            }
            None => {
                if ctx.tracker.is_complete() {
                    break;
                }
                idle_spins += 1;
                if idle_spins > MAX_IDLE_SPINS {
                    thread::sleep(Duration::from_micros(100));
                } else {
                    thread::yield_now();
                }
                continue;
            }
        };

        let outcome = visit_directory(&task, &ctx, |subtask| local.push(subtask));
        log_outcome(id, &outcome);
        visited += 1;

        // Finishes the visit
        drop(task);
    }

    debug!(worker = id, visited = visited, "Worker finished");
}

/// Pop local work first, then refill from the injector, then steal
fn find_task(
    local: &DequeWorker<DirTask>,
    injector: &Injector<DirTask>,
    stealers: &[Stealer<DirTask>],
) -> Option<DirTask> {
    local.pop().or_else(|| {
        iter::repeat_with(|| {
            injector
                .steal_batch_and_pop(local)
                .or_else(|| stealers.iter().map(|s| s.steal()).collect())
        })
        .find(|s| !s.is_retry())
        .and_then(|s| s.success())
    })
}

pub(crate) fn log_outcome(worker: usize, outcome: &VisitOutcome) {
    match outcome {
        VisitOutcome::Success { path, files, subdirs } => {
            trace!(
                worker = worker,
                path = %path.display(),
                files = files,
                subdirs = subdirs,
                "Directory scanned"
            );
        }
        VisitOutcome::Skipped { path, reason } => {
            debug!(worker = worker, path = %path.display(), reason = %reason, "Directory skipped");
        }
        VisitOutcome::Failed { path, error } => {
            warn!(worker = worker, path = %path.display(), error = %error, "Directory failed");
        }
    }
}

/// List one directory below the root and process its entries
///
/// Read failures are absorbed into the returned outcome.
pub fn visit_directory<F>(task: &DirTask, ctx: &VisitContext, schedule: F) -> VisitOutcome
where
    F: FnMut(DirTask),
{
    match fs::read_dir(&task.path) {
        Ok(entries) => scan_entries(task, entries, ctx, schedule),
        Err(e) => {
            let outcome = VisitOutcome::from_io_error(task.path.clone(), e);
            match &outcome {
                VisitOutcome::Skipped { .. } => ctx.counters.record_skip(),
                _ => ctx.counters.record_error(),
            }
            outcome
        }
    }
}

/// Process the entries of an already-opened directory
///
/// Admitted subdirectories are scheduled through `schedule`; admitted files
/// are sent to the collector as a single batch before returning.
pub fn scan_entries<F>(
    task: &DirTask,
    entries: ReadDir,
    ctx: &VisitContext,
    mut schedule: F,
) -> VisitOutcome
where
    F: FnMut(DirTask),
{
    let config = &ctx.config;
    let child_depth = task.depth + 1;

    let mut batch: Vec<FileRecord> = Vec::new();
    let mut bytes = 0u64;
    let mut subdirs = 0usize;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(path = %task.path.display(), error = %e, "Unreadable directory entry");
                ctx.counters.record_error();
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if !config.admits_name(&name) {
            continue;
        }

        let path = entry.path();
        if config.is_excluded(&path.to_string_lossy()) {
            ctx.counters.record_skip();
            continue;
        }

        match classify(&entry, &path, name, config.follow_links) {
            Ok(EntryKind::Directory) => {
                if config.admits_depth(child_depth) {
                    subdirs += 1;
                    schedule(ctx.tracker.schedule(path, child_depth));
                }
            }
            Ok(EntryKind::File(record)) => {
                bytes += record.size;
                batch.push(record);
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Cannot stat entry");
                ctx.counters.record_error();
            }
        }
    }

    let files = batch.len();
    ctx.counters.record_dir();
    ctx.counters.record_files(files as u64, bytes);

    if let Err(e) = ctx.collector.observe_batch(batch) {
        warn!(path = %task.path.display(), error = %e, "Failed to send files to collector");
    }

    VisitOutcome::Success {
        path: task.path.clone(),
        files,
        subdirs,
    }
}

/// Decide whether an entry is a directory to descend into or a file to count
///
/// Without link following, a symlink is counted as a file in its own right.
/// With it, the link target decides; dangling links still count as files.
fn classify(
    entry: &DirEntry,
    path: &Path,
    name: String,
    follow_links: bool,
) -> std::io::Result<EntryKind> {
    let file_type = entry.file_type()?;

    if file_type.is_dir() {
        return Ok(EntryKind::Directory);
    }

    if file_type.is_symlink() && follow_links {
        if let Ok(target) = fs::metadata(path) {
            if target.is_dir() {
                return Ok(EntryKind::Directory);
            }
            return Ok(EntryKind::File(FileRecord::from_metadata(name, &target)));
        }
    }

    let metadata = entry.metadata()?;
    Ok(EntryKind::File(FileRecord::from_metadata(name, &metadata)))
}
