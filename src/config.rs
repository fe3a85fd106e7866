//! Configuration types for dirx
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - The admission rules derived from it (depth, hidden names, exclusions)

use crate::error::ConfigError;
use crate::stats::SortOrder;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;

/// Maximum reasonable thread count
const MAX_THREADS: usize = 512;

/// Summarize a directory tree by file extension
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dirx",
    version,
    about = "Summarize a directory tree by file extension",
    long_about = "Walks a directory tree in parallel and reports, for each kind of file, \
                  how many there are and how many bytes they take.\n\n\
                  Synonym extensions (jpg/jpeg/jpe, htm/html, ...) share one row.\n\n\
                  When stdin is not a terminal, file paths are read from stdin instead.",
    after_help = "EXAMPLES:\n    \
        dirx -r ~/Pictures\n    \
        dirx -r -s --maxdepth 3 /var/log\n    \
        dirx -r -x --exclude '/target/' .\n    \
        find . -name '*.log' | dirx"
)]
pub struct CliArgs {
    /// Directory to summarize
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Follow symbolic links
    #[arg(short = 'l', long = "follow")]
    pub follow_links: bool,

    /// Include hidden files and directories
    #[arg(short = 'H', long)]
    pub hidden: bool,

    /// Recurse into subdirectories
    #[arg(short = 'r', long)]
    pub recurse: bool,

    /// Maximum depth (0 means unlimited, 1 is the starting directory only)
    #[arg(short = 'd', long = "maxdepth", default_value = "0", value_name = "NUM")]
    pub max_depth: usize,

    /// Sort by total size instead of file count
    #[arg(short = 's', long = "size")]
    pub sort_by_size: bool,

    /// Show the file name when a row holds a single file
    #[arg(short = 'o', long = "only")]
    pub show_single_name: bool,

    /// Print numbers without thousands separators
    #[arg(short = 'n', long = "numbers")]
    pub no_separators: bool,

    /// Show smallest/largest size and oldest/newest modification date
    #[arg(short = 'x', long)]
    pub details: bool,

    /// Skip paths matching pattern (can be repeated)
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Number of traversal threads
    #[arg(
        short = 'j',
        long,
        default_value_t = default_threads(),
        value_name = "NUM"
    )]
    pub threads: usize,

    /// Show a progress spinner and summary on stderr
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_threads() -> usize {
    // Directory reads are I/O bound
    (num_cpus::get() * 2).min(MAX_THREADS)
}

/// Options that only affect how the report is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Replace the extension label with the file name for single-file rows
    pub show_single_name: bool,

    /// Print plain numbers
    pub no_separators: bool,

    /// Extra size and date columns
    pub details: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct CensusConfig {
    /// Directory to walk
    pub root: PathBuf,

    /// Skip dot-prefixed entries
    pub skip_hidden: bool,

    /// Resolve symbolic links
    pub follow_links: bool,

    /// Descend into subdirectories
    pub recurse: bool,

    /// Maximum depth, 0 for unlimited
    pub max_depth: usize,

    /// Report ordering
    pub sort_order: SortOrder,

    /// Report rendering
    pub display: DisplayOptions,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Number of traversal threads
    pub thread_count: usize,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            skip_hidden: true,
            follow_links: false,
            recurse: false,
            max_depth: 0,
            sort_order: SortOrder::Count,
            display: DisplayOptions::default(),
            exclude_patterns: Vec::new(),
            thread_count: 4,
            show_progress: false,
            verbose: false,
        }
    }
}

impl CensusConfig {
    /// Configuration for a recursive walk of `root` with default settings
    pub fn recursive(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recurse: true,
            ..Self::default()
        }
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyRoot);
        }

        // Validate thread count
        if args.threads == 0 || args.threads > MAX_THREADS {
            return Err(ConfigError::InvalidThreadCount {
                count: args.threads,
                max: MAX_THREADS,
            });
        }

        // Compile exclude patterns
        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sort_order = if args.sort_by_size {
            SortOrder::Size
        } else {
            SortOrder::Count
        };

        Ok(Self {
            root: args.path,
            skip_hidden: !args.hidden,
            follow_links: args.follow_links,
            recurse: args.recurse,
            max_depth: args.max_depth,
            sort_order,
            display: DisplayOptions {
                show_single_name: args.show_single_name,
                no_separators: args.no_separators,
                details: args.details,
            },
            exclude_patterns,
            thread_count: args.threads,
            show_progress: args.progress,
            verbose: args.verbose,
        })
    }

    /// Depth limit actually in force
    ///
    /// Non-recursive walks are capped at 1 (the root only).
    pub fn effective_max_depth(&self) -> Option<usize> {
        if !self.recurse {
            Some(1)
        } else if self.max_depth > 0 {
            Some(self.max_depth)
        } else {
            None
        }
    }

    /// Check if a subdirectory at `depth` may be scanned
    ///
    /// The root (depth 0) is always scanned and never passes through here.
    pub fn admits_depth(&self, depth: usize) -> bool {
        self.effective_max_depth().map_or(true, |max| depth < max)
    }

    /// Check if an entry name passes the hidden-name rule
    pub fn admits_name(&self, name: &str) -> bool {
        !(self.skip_hidden && crate::stats::is_hidden(name))
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_patterns.iter().any(|re| re.is_match(path))
    }
}
