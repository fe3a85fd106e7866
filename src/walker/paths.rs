//! Census over an explicit list of paths
//!
//! Instead of walking a tree, read one path per line (typically piped from
//! `find`) and count each regular file. Directories in the list are ignored;
//! unreadable paths are logged and skipped.

use crate::config::CensusConfig;
use crate::error::Result;
use crate::stats::{ExtensionTable, FileRecord};
use crate::walker::coordinator::{Census, WalkSummary};
use crate::walker::worker::WalkCounters;
use std::fs::{self, Metadata};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{debug, info};

/// Check whether stdin with this metadata carries a path list
///
/// Terminals and `/dev/null` are character devices; anything else (a pipe,
/// a redirected file) is read as input.
#[cfg(unix)]
pub fn is_path_list(metadata: &Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;

    let file_type = metadata.file_type();
    !(file_type.is_char_device() || file_type.is_dir())
}

#[cfg(not(unix))]
pub fn is_path_list(metadata: &Metadata) -> bool {
    metadata.is_file()
}

/// Check whether this process should read paths from stdin
pub fn stdin_is_path_list() -> bool {
    #[cfg(unix)]
    {
        use std::os::fd::AsFd;

        let stdin = io::stdin();
        match stdin
            .as_fd()
            .try_clone_to_owned()
            .and_then(|fd| fs::File::from(fd).metadata())
        {
            Ok(metadata) => is_path_list(&metadata),
            // Closed stdin
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    {
        use std::io::IsTerminal;

        !io::stdin().is_terminal()
    }
}

/// Build a census from newline-separated paths
///
/// Lines need not be valid UTF-8. Only a failure to read `reader` itself is
/// an error.
pub fn scan_paths<R: BufRead>(mut reader: R, config: &CensusConfig) -> Result<Census> {
    let start = Instant::now();
    let counters = WalkCounters::default();
    let mut table = ExtensionTable::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        let raw = trim_line_end(&line);
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let path = path_from_bytes(raw);
        if let Some(record) = admit_path(&path, config, &counters) {
            counters.record_files(1, record.size);
            table.observe(&record);
        }
    }

    let summary = WalkSummary {
        dirs: 0,
        files: counters.files.load(Ordering::Relaxed),
        bytes: counters.bytes.load(Ordering::Relaxed),
        errors: counters.errors.load(Ordering::Relaxed),
        skipped: counters.skipped.load(Ordering::Relaxed),
        duration: start.elapsed(),
    };

    info!(files = summary.files, errors = summary.errors, "Path list processed");

    Ok(Census { table, summary })
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(unix)]
fn path_from_bytes(raw: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(raw))
}

#[cfg(not(unix))]
fn path_from_bytes(raw: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(raw).into_owned())
}

fn admit_path(path: &Path, config: &CensusConfig, counters: &WalkCounters) -> Option<FileRecord> {
    let name = path.file_name()?.to_string_lossy().into_owned();

    if !config.admits_name(&name) {
        return None;
    }
    if config.is_excluded(&path.to_string_lossy()) {
        counters.record_skip();
        return None;
    }

    let metadata = if config.follow_links {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    };

    match metadata {
        Ok(metadata) if metadata.is_dir() => None,
        Ok(metadata) => Some(FileRecord::from_metadata(name, &metadata)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot stat listed path");
            counters.record_error();
            None
        }
    }
}
