//! Progress reporting for the directory walk
//!
//! Everything here writes to stderr so the report on stdout stays clean
//! for piping.

use crate::report::format_number;
use crate::walker::{WalkProgress, WalkSummary};
use console::{style, Term};
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Spinner showing live walk counters
///
/// Clones share the same spinner.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        bar.set_style(style);

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &WalkProgress) {
        self.bar.set_message(progress_message(progress));
    }

    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Spinner text for a progress snapshot
fn progress_message(progress: &WalkProgress) -> String {
    format!(
        "Dirs: {} | Files: {} | Size: {} | Rate: {:.0}/s | Pending: {}",
        format_number(progress.dirs),
        format_number(progress.files),
        format_size(progress.bytes, BINARY),
        progress.files_per_second(),
        progress.pending,
    )
}

/// Print a header at the start of the walk
pub fn print_header(root: &Path, threads: usize) {
    let term = Term::stderr();
    let _ = term.write_line("");
    let _ = term.write_line(&format!(
        "{} {}",
        style("dirx").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    ));
    let _ = term.write_line(&style("─".repeat(50)).dim().to_string());
    let _ = term.write_line(&format!("  {} {}", style("Root:").bold(), root.display()));
    let _ = term.write_line(&format!("  {} {}", style("Threads:").bold(), threads));
    let _ = term.write_line("");
}

/// Print totals for a finished census
pub fn print_summary(summary: &WalkSummary, extensions: usize) {
    let duration_secs = summary.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        summary.files as f64 / duration_secs
    } else {
        0.0
    };

    let term = Term::stderr();
    let mut lines = vec![
        String::new(),
        style("Census Complete").green().bold().to_string(),
        style("─".repeat(50)).dim().to_string(),
        format!("  {} {}", style("Directories:").bold(), format_number(summary.dirs)),
        format!("  {} {}", style("Files:").bold(), format_number(summary.files)),
        format!(
            "  {} {}",
            style("Total Size:").bold(),
            format_size(summary.bytes, BINARY)
        ),
        format!("  {} {}", style("Extensions:").bold(), format_number(extensions as u64)),
        format!(
            "  {} {:.1}s ({:.0} files/sec)",
            style("Duration:").bold(),
            duration_secs,
            rate
        ),
    ];
    if summary.skipped > 0 {
        lines.push(format!(
            "  {} {}",
            style("Skipped:").dim().bold(),
            format_number(summary.skipped)
        ));
    }
    if summary.errors > 0 {
        lines.push(format!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(summary.errors)
        ));
    }
    lines.push(String::new());

    for line in lines {
        let _ = term.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_message() {
        let progress = WalkProgress {
            dirs: 12,
            files: 3400,
            bytes: 2048,
            errors: 0,
            pending: 5,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(
            progress_message(&progress),
            "Dirs: 12 | Files: 3,400 | Size: 2 KiB | Rate: 1700/s | Pending: 5"
        );
    }

    #[test]
    fn test_reporter_clones_share_spinner() {
        let reporter = ProgressReporter::new();
        let handle = reporter.clone();

        let progress = WalkProgress {
            files: 10,
            ..Default::default()
        };
        handle.update(&progress);
        assert_eq!(reporter.bar.message(), progress_message(&progress));

        reporter.finish("Walked 1 directories");
        assert!(handle.bar.is_finished());
        assert_eq!(handle.bar.message(), "Walked 1 directories");
    }
}
