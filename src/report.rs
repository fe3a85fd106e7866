//! Report rendering
//!
//! Turns the sorted statistics into aligned text columns: label (left
//! aligned), file count and total bytes (right aligned), plus optional
//! detail columns. Nothing here feeds back into the walk.

use crate::config::DisplayOptions;
use crate::error::Result;
use crate::stats::ExtensionStats;
use std::io::{self, Write};

/// Label shown for files without an extension
pub const NO_EXTENSION_LABEL: &str = "(none)";

/// Narrowest the label column is squeezed to when fitting a terminal
const MIN_LABEL_WIDTH: usize = 8;

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

fn format_count(n: u64, options: &DisplayOptions) -> String {
    if options.no_separators {
        n.to_string()
    } else {
        format_number(n)
    }
}

/// Text for the first column of a row
pub fn format_label(stats: &ExtensionStats, options: &DisplayOptions) -> String {
    if options.show_single_name {
        if let Some(name) = stats.single_name() {
            return name.to_string();
        }
    }

    if stats.is_no_extension() {
        return NO_EXTENSION_LABEL.to_string();
    }

    stats
        .extensions
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",")
}

/// Rows of text with per-column width and alignment
#[derive(Debug, Clone, Default)]
pub struct ReportTable {
    rows: Vec<Vec<String>>,
    widths: Vec<usize>,
    right_align: Vec<bool>,
}

impl ReportTable {
    pub fn new(right_align: Vec<bool>) -> Self {
        Self {
            rows: Vec::new(),
            widths: vec![0; right_align.len()],
            right_align,
        }
    }

    pub fn add_row(&mut self, cols: Vec<String>) {
        if self.widths.len() < cols.len() {
            self.widths.resize(cols.len(), 0);
        }
        for (width, col) in self.widths.iter_mut().zip(&cols) {
            *width = (*width).max(col.chars().count());
        }
        self.rows.push(cols);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Narrow the first column so a full row fits in `max_width` characters
    pub fn fit_width(&mut self, max_width: usize) {
        if self.widths.is_empty() {
            return;
        }
        let separators = self.widths.len() - 1;
        let rest: usize = self.widths[1..].iter().sum::<usize>() + separators;
        let available = max_width.saturating_sub(rest).max(MIN_LABEL_WIDTH);
        if self.widths[0] > available {
            self.widths[0] = available;
        }
    }

    /// Render one row, columns separated by a single space
    pub fn render_row(&self, index: usize) -> String {
        self.rows[index]
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let width = self.widths[i];
                let col = truncate(col, width);
                if self.right_align.get(i).copied().unwrap_or(false) {
                    format!("{:>width$}", col, width = width)
                } else {
                    format!("{:<width$}", col, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Lay out sorted statistics as a table
pub fn build_table(stats: &[ExtensionStats], options: &DisplayOptions) -> ReportTable {
    let mut table = if options.details {
        ReportTable::new(vec![false, true, true, true, true, false, false])
    } else {
        ReportTable::new(vec![false, true, true])
    };

    for entry in stats {
        let mut cols = vec![
            format_label(entry, options),
            format_count(entry.count, options),
            format_count(entry.total_bytes, options),
        ];
        if options.details {
            cols.push(format_count(entry.min_size, options));
            cols.push(format_count(entry.max_size, options));
            cols.push(entry.oldest.format("%Y-%m-%d").to_string());
            cols.push(entry.newest.format("%Y-%m-%d").to_string());
        }
        table.add_row(cols);
    }

    table
}

/// Write the report, optionally fitted to a terminal width
pub fn write_report<W: Write>(
    out: &mut W,
    stats: &[ExtensionStats],
    options: &DisplayOptions,
    max_width: Option<usize>,
) -> io::Result<()> {
    let mut table = build_table(stats, options);
    if let Some(width) = max_width {
        table.fit_width(width);
    }
    for i in 0..table.len() {
        writeln!(out, "{}", table.render_row(i))?;
    }
    out.flush()
}

/// Print the report to stdout
///
/// A closed pipe (`dirx | head`) ends output quietly.
pub fn print_report(stats: &[ExtensionStats], options: &DisplayOptions) -> Result<()> {
    let term = console::Term::stdout();
    let max_width = if term.is_term() {
        term.size_checked().map(|(_, cols)| cols as usize)
    } else {
        None
    };

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    match write_report(&mut out, stats, options, max_width) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.map_err(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::FileRecord;
    use chrono::{TimeZone, Utc};

    fn bat() -> ExtensionStats {
        let first = FileRecord::new("readme.bat", 0, Utc.timestamp_opt(0, 0).unwrap());
        let mut stats = ExtensionStats::from_record("bat", &first);
        stats.count = 1234;
        stats.total_bytes = 5678;
        stats.max_size = 2345;
        stats
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_render_row() {
        let stats = vec![bat()];

        let plain = DisplayOptions {
            no_separators: true,
            ..Default::default()
        };
        assert_eq!(build_table(&stats, &plain).render_row(0), ".bat 1234 5678");

        let grouped = DisplayOptions::default();
        assert_eq!(build_table(&stats, &grouped).render_row(0), ".bat 1,234 5,678");
    }

    #[test]
    fn test_columns_align() {
        let mut table = ReportTable::new(vec![false, true]);
        table.add_row(vec![".rs".into(), "5".into()]);
        table.add_row(vec![".jpeg,.jpg".into(), "1,234".into()]);

        assert_eq!(table.render_row(0), format!(".rs{}5", " ".repeat(12)));
        assert_eq!(table.render_row(1), ".jpeg,.jpg 1,234");
    }

    #[test]
    fn test_labels() {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        let mut jpeg = ExtensionStats::from_record("jpg", &FileRecord::new("a.jpg", 1, at));
        jpeg.absorb(&ExtensionStats::from_record("jpeg", &FileRecord::new("b.jpeg", 1, at)));
        let single = ExtensionStats::from_record("pdf", &FileRecord::new("cv.pdf", 1, at));
        let none = ExtensionStats::from_record("", &FileRecord::new("Makefile", 1, at));

        let options = DisplayOptions::default();
        assert_eq!(format_label(&jpeg, &options), ".jpeg,.jpg");
        assert_eq!(format_label(&single, &options), ".pdf");
        assert_eq!(format_label(&none, &options), NO_EXTENSION_LABEL);

        let only = DisplayOptions {
            show_single_name: true,
            ..Default::default()
        };
        assert_eq!(format_label(&single, &only), "cv.pdf");
        assert_eq!(format_label(&none, &only), "Makefile");
        assert_eq!(format_label(&jpeg, &only), ".jpeg,.jpg");
    }

    #[test]
    fn test_fit_width_truncates_label() {
        let mut table = ReportTable::new(vec![false, true, true]);
        table.add_row(vec![
            ".averyveryverylongextension".into(),
            "1".into(),
            "2".into(),
        ]);
        table.fit_width(16);

        let row = table.render_row(0);
        assert_eq!(row.chars().count(), 16);
        assert!(row.starts_with(".averyveryv… 1 2"));
    }

    #[test]
    fn test_details_columns() {
        let options = DisplayOptions {
            details: true,
            no_separators: true,
            ..Default::default()
        };
        let row = build_table(&[bat()], &options).render_row(0);
        assert_eq!(row, ".bat 1234 5678 0 2345 1970-01-01 1970-01-01");
    }

    #[test]
    fn test_write_report() {
        let mut out = Vec::new();
        write_report(&mut out, &[bat()], &DisplayOptions::default(), None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ".bat 1,234 5,678\n");
    }
}
