//! Statistics collector
//!
//! The collector thread is the single owner of the [`ExtensionTable`].
//! Walker threads never touch the table; they push batches of
//! [`FileRecord`]s through a bounded channel via a [`CollectorHandle`].
//!
//! ```text
//! Worker 0 ──┐
//! Worker 1 ──┼── Vec<FileRecord> ──► collector thread ──► ExtensionTable
//! Worker N ──┘    (crossbeam bounded)
//! ```
//!
//! The thread exits once every handle has been dropped and returns the
//! finished table to whoever joins it.

use crate::error::{CensusError, Result, WorkerError};
use crate::stats::types::{ExtensionStats, FileRecord};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::collections::HashMap;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Capacity of the record channel, in batches
const CHANNEL_CAPACITY: usize = 256;

/// Per-raw-extension statistics
#[derive(Debug, Default, Clone)]
pub struct ExtensionTable {
    entries: HashMap<String, ExtensionStats>,
}

impl ExtensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file into the entry for its raw extension
    pub fn observe(&mut self, record: &FileRecord) {
        let extension = record.extension();
        match self.entries.get_mut(extension) {
            Some(stats) => stats.observe(record),
            None => {
                self.entries.insert(
                    extension.to_string(),
                    ExtensionStats::from_record(extension, record),
                );
            }
        }
    }

    pub fn get(&self, extension: &str) -> Option<&ExtensionStats> {
        self.entries.get(extension)
    }

    /// Number of distinct raw extensions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of files observed
    pub fn file_count(&self) -> u64 {
        self.entries.values().map(|s| s.count).sum()
    }

    /// Iterate entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionStats> {
        self.entries.values()
    }

    pub fn into_stats(self) -> impl Iterator<Item = ExtensionStats> {
        self.entries.into_values()
    }
}

impl FromIterator<FileRecord> for ExtensionTable {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut table = ExtensionTable::new();
        for record in iter {
            table.observe(&record);
        }
        table
    }
}

/// Cloneable sending side of the collector
#[derive(Clone)]
pub struct CollectorHandle {
    sender: Sender<Vec<FileRecord>>,
}

impl CollectorHandle {
    /// Hand one file to the collector
    pub fn observe(&self, record: FileRecord) -> Result<()> {
        self.observe_batch(vec![record])
    }

    /// Hand a batch of files to the collector
    ///
    /// Blocks while the channel is full.
    pub fn observe_batch(&self, records: Vec<FileRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.sender
            .send(records)
            .map_err(|_| CensusError::ChannelClosed)
    }
}

/// The collector thread
pub struct Collector {
    handle: JoinHandle<ExtensionTable>,
}

impl Collector {
    /// Spawn the collector thread and return it with its first handle
    pub fn spawn() -> Result<(Self, CollectorHandle)> {
        let (sender, receiver) = bounded::<Vec<FileRecord>>(CHANNEL_CAPACITY);

        let handle = thread::Builder::new()
            .name("collector".to_string())
            .spawn(move || collector_loop(receiver))
            .map_err(|e| WorkerError::InitFailed {
                id: usize::MAX,
                reason: e.to_string(),
            })?;

        Ok((Self { handle }, CollectorHandle { sender }))
    }

    /// Wait for every handle to be dropped and return the table
    pub fn finish(self) -> Result<ExtensionTable> {
        self.handle
            .join()
            .map_err(|_| CensusError::Worker(WorkerError::CollectorPanicked))
    }
}

fn collector_loop(receiver: Receiver<Vec<FileRecord>>) -> ExtensionTable {
    debug!("Collector thread started");

    let mut table = ExtensionTable::new();
    let mut batches = 0u64;

    while let Ok(records) = receiver.recv() {
        for record in &records {
            table.observe(record);
        }
        batches += 1;
    }

    debug!(
        batches = batches,
        extensions = table.len(),
        files = table.file_count(),
        "Collector thread finished"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(name: &str, size: u64) -> FileRecord {
        FileRecord::new(name, size, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    #[test]
    fn test_table_groups_by_raw_extension() {
        let table: ExtensionTable = vec![
            record("a.rs", 10),
            record("b.rs", 20),
            record("c.RS", 5),
            record("Makefile", 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("rs").map(|s| s.count), Some(2));
        assert_eq!(table.get("RS").map(|s| s.count), Some(1));
        assert_eq!(table.get("").map(|s| s.sample_name.as_str()), Some("Makefile"));
        assert_eq!(table.file_count(), 4);
    }

    #[test]
    fn test_collector_concurrent_handles() {
        let (collector, handle) = Collector::spawn().unwrap();

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        handle.observe(record(&format!("f{}_{}.log", t, i), 1)).unwrap();
                    }
                })
            })
            .collect();
        drop(handle);

        for t in threads {
            t.join().unwrap();
        }

        let table = collector.finish().unwrap();
        let logs = table.get("log").unwrap();
        assert_eq!(logs.count, 800);
        assert_eq!(logs.total_bytes, 800);
    }

    #[test]
    fn test_empty_batch_is_not_sent() {
        let (collector, handle) = Collector::spawn().unwrap();
        handle.observe_batch(Vec::new()).unwrap();
        drop(handle);
        assert!(collector.finish().unwrap().is_empty());
    }
}
