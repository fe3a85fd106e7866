//! Per-extension statistics
//!
//! - [`types`]: file records and the per-bucket summary
//! - [`collector`]: the thread that owns the statistics table during a walk
//! - [`canonical`]: synonym extensions mapped onto shared groups
//! - [`merge`]: folding raw buckets into groups, and ordering the result

pub mod canonical;
pub mod collector;
pub mod merge;
pub mod types;

pub use canonical::{Canonicalizer, EXTENSION_GROUPS};
pub use collector::{Collector, CollectorHandle, ExtensionTable};
pub use merge::{merge, sort_stats, summarize, SortOrder};
pub use types::{is_hidden, raw_extension, ExtensionStats, FileRecord, NO_EXTENSION};
