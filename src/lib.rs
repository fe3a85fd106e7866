//! dirx - summarize a directory tree by file extension
//!
//! Walks a directory (optionally recursively, in parallel) and reports how
//! many files carry each extension and how many bytes they occupy. Spelling
//! variants of one format (`jpg`, `jpeg`, `JPG`) are folded into a single
//! row before printing.
//!
//! # Architecture
//!
//! ```text
//!   PATH ──► CensusWalker ──► worker pool ──► Collector ──► ExtensionTable
//!                                                               │
//!   stdin path list ──► scan_paths ─────────────────────────────┤
//!                                                               ▼
//!                                         merge (Canonicalizer) + sort
//!                                                               │
//!                                                               ▼
//!                                                    report (stdout)
//! ```
//!
//! # Example
//!
//! ```bash
//! # Extensions in the current directory
//! dirx
//!
//! # Whole tree, largest first, with size and date columns
//! dirx -r -s -x ~/projects
//!
//! # Count an explicit list of files
//! find . -name '*.log' | dirx
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod stats;
pub mod walker;

pub use config::{CensusConfig, CliArgs, DisplayOptions};
pub use error::{CensusError, Result, VisitOutcome};
pub use stats::{summarize, Canonicalizer, ExtensionStats, SortOrder};
pub use walker::{scan_paths, Census, CensusWalker, WalkSummary};
