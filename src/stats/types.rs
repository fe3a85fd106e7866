//! Census data model
//!
//! [`FileRecord`] is what the walker emits for every admitted file.
//! [`ExtensionStats`] is the running summary for one bucket: a raw
//! extension while the walk is in progress, a canonical group after merging.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::SystemTime;

/// Key used for files whose name carries no extension
pub const NO_EXTENSION: &str = "";

/// Extract the raw extension from a file name
///
/// The extension is the text after the final `.`, provided that dot is
/// neither the first nor the last character of the name. Returns
/// [`NO_EXTENSION`] otherwise.
///
/// ```
/// use dirx::stats::raw_extension;
///
/// assert_eq!(raw_extension("archive.tar.gz"), "gz");
/// assert_eq!(raw_extension(".bashrc"), "");
/// assert_eq!(raw_extension("Makefile"), "");
/// ```
pub fn raw_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => &name[idx + 1..],
        _ => NO_EXTENSION,
    }
}

/// Check whether a file or directory name is hidden (dot-prefixed)
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// One admitted file, as seen by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File name (no directory component)
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Last modification time
    pub modified: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, size: u64, modified: impl Into<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            size,
            modified: modified.into(),
        }
    }

    /// Build a record from filesystem metadata
    pub fn from_metadata(name: impl Into<String>, metadata: &std::fs::Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Self::new(name, metadata.len(), modified)
    }

    /// Raw extension of this file's name
    pub fn extension(&self) -> &str {
        raw_extension(&self.name)
    }
}

/// Aggregated statistics for one extension bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionStats {
    /// Raw extension, or canonical group key once merged
    pub key: String,

    /// Raw extensions actually observed in this bucket
    pub extensions: BTreeSet<String>,

    /// Name of the first file seen for this bucket
    pub sample_name: String,

    pub count: u64,
    pub total_bytes: u64,
    pub min_size: u64,
    pub max_size: u64,

    /// Earliest modification time seen
    pub oldest: DateTime<Utc>,

    /// Latest modification time seen
    pub newest: DateTime<Utc>,
}

impl ExtensionStats {
    /// Start a bucket from its first observed file
    pub fn from_record(extension: &str, record: &FileRecord) -> Self {
        Self {
            key: extension.to_string(),
            extensions: BTreeSet::from([extension.to_string()]),
            sample_name: record.name.clone(),
            count: 1,
            total_bytes: record.size,
            min_size: record.size,
            max_size: record.size,
            oldest: record.modified,
            newest: record.modified,
        }
    }

    /// Fold one more file into this bucket
    pub fn observe(&mut self, record: &FileRecord) {
        self.count += 1;
        self.total_bytes += record.size;
        self.min_size = self.min_size.min(record.size);
        self.max_size = self.max_size.max(record.size);
        self.oldest = self.oldest.min(record.modified);
        self.newest = self.newest.max(record.modified);
    }

    /// Fold another bucket into this one
    ///
    /// The sample name is kept from `self`; the constituent extension sets
    /// are unioned.
    pub fn absorb(&mut self, other: &ExtensionStats) {
        self.extensions.extend(other.extensions.iter().cloned());
        self.count += other.count;
        self.total_bytes += other.total_bytes;
        self.min_size = self.min_size.min(other.min_size);
        self.max_size = self.max_size.max(other.max_size);
        self.oldest = self.oldest.min(other.oldest);
        self.newest = self.newest.max(other.newest);
    }

    /// Comma-joined, sorted list of the observed raw extensions
    pub fn label(&self) -> String {
        self.extensions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The literal filename, when the bucket holds exactly one file of one extension
    pub fn single_name(&self) -> Option<&str> {
        if self.count == 1 && self.extensions.len() == 1 {
            Some(&self.sample_name)
        } else {
            None
        }
    }

    /// Check if this is the bucket for files without an extension
    pub fn is_no_extension(&self) -> bool {
        self.key == NO_EXTENSION
    }
}
