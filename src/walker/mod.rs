//! Parallel directory walker
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │      CensusWalker        │
//!                 │  - lists the root        │
//!                 │  - waits on WorkTracker  │
//!                 └────────────┬─────────────┘
//!                              │ Injector<DirTask>
//!       ┌──────────────────────┼──────────────────────┐
//!       │                      │                      │
//! ┌─────▼─────┐          ┌─────▼─────┐          ┌─────▼─────┐
//! │ Worker 0  │◄─ steal ─│ Worker 1  │─ steal ─►│ Worker N  │
//! │ read_dir  │          │ read_dir  │          │ read_dir  │
//! └─────┬─────┘          └─────┬─────┘          └─────┬─────┘
//!       └──────────────────────┼──────────────────────┘
//!                              │ Vec<FileRecord>
//!                      ┌───────▼────────┐
//!                      │   Collector    │
//!                      │ ExtensionTable │
//!                      └────────────────┘
//! ```
//!
//! Every subdirectory is scheduled through the [`WorkTracker`], which counts
//! outstanding visits. The walk is over when that count returns to zero.

pub mod coordinator;
pub mod paths;
pub mod queue;
pub mod worker;

pub use coordinator::{Census, CensusWalker, WalkProgress, WalkSummary};
pub use paths::{is_path_list, scan_paths, stdin_is_path_list};
pub use queue::{DirTask, WorkTracker};
pub use worker::{visit_directory, WalkCounters};
