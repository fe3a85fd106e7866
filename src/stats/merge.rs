//! Merging raw-extension statistics into canonical groups, and ordering them
//!
//! Two explicit phases: the walk produces one [`ExtensionStats`] per raw
//! extension, then [`merge`] re-keys each by its canonical group and folds
//! them together. [`sort_stats`] orders the materialized list.

use crate::stats::canonical::Canonicalizer;
use crate::stats::types::ExtensionStats;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Report ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most files first
    #[default]
    Count,
    /// Most bytes first
    Size,
}

/// Fold per-extension statistics into per-group statistics
///
/// Input order does not matter: entries are folded in key order, so the
/// sample name of a group always comes from its lexically first member.
/// Merging already-merged output returns it unchanged.
pub fn merge<I>(stats: I, canonicalizer: &Canonicalizer) -> Vec<ExtensionStats>
where
    I: IntoIterator<Item = ExtensionStats>,
{
    let mut stats: Vec<ExtensionStats> = stats.into_iter().collect();
    stats.sort_by(|a, b| a.key.cmp(&b.key));

    let mut groups: HashMap<String, ExtensionStats> = HashMap::with_capacity(stats.len());

    for mut entry in stats {
        let group = canonicalizer.canonicalize(&entry.key).to_string();
        match groups.get_mut(&group) {
            Some(existing) => existing.absorb(&entry),
            None => {
                entry.key = group.clone();
                groups.insert(group, entry);
            }
        }
    }

    groups.into_values().collect()
}

/// Sort merged statistics for display
///
/// Descending by count or by total bytes; ties are broken by the
/// case-insensitive label, then the exact label.
pub fn sort_stats(stats: &mut [ExtensionStats], order: SortOrder) {
    stats.sort_by(|a, b| compare(a, b, order));
}

fn compare(a: &ExtensionStats, b: &ExtensionStats, order: SortOrder) -> Ordering {
    let primary = match order {
        SortOrder::Count => b.count.cmp(&a.count),
        SortOrder::Size => b.total_bytes.cmp(&a.total_bytes),
    };

    primary.then_with(|| {
        let (la, lb) = (a.label(), b.label());
        la.to_lowercase()
            .cmp(&lb.to_lowercase())
            .then_with(|| la.cmp(&lb))
    })
}

/// Merge and sort in one step
pub fn summarize<I>(stats: I, canonicalizer: &Canonicalizer, order: SortOrder) -> Vec<ExtensionStats>
where
    I: IntoIterator<Item = ExtensionStats>,
{
    let mut merged = merge(stats, canonicalizer);
    sort_stats(&mut merged, order);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::collector::ExtensionTable;
    use crate::stats::types::FileRecord;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn bucket(ext: &str, count: u64, bytes: u64) -> ExtensionStats {
        let mut stats =
            ExtensionStats::from_record(ext, &FileRecord::new(format!("f.{}", ext), 0, at(0)));
        stats.count = count;
        stats.total_bytes = bytes;
        stats
    }

    fn labels(stats: &[ExtensionStats]) -> Vec<String> {
        stats.iter().map(|s| s.label()).collect()
    }

    #[test]
    fn test_sort_by_count_breaks_ties_alphabetically() {
        let mut stats = vec![bucket("a", 2, 0), bucket("b", 5, 0), bucket("c", 2, 0)];
        sort_stats(&mut stats, SortOrder::Count);
        assert_eq!(labels(&stats), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_by_size() {
        let mut stats = vec![bucket("a", 9, 10), bucket("B", 1, 30), bucket("c", 1, 10)];
        sort_stats(&mut stats, SortOrder::Size);
        assert_eq!(labels(&stats), vec!["B", "a", "c"]);
    }

    #[test]
    fn test_tie_break_is_case_insensitive() {
        let mut stats = vec![bucket("b", 1, 0), bucket("A", 1, 0), bucket("a", 1, 0)];
        sort_stats(&mut stats, SortOrder::Count);
        assert_eq!(labels(&stats), vec!["A", "a", "b"]);
    }

    #[test]
    fn test_merge_jpeg_synonyms() {
        let table: ExtensionTable = vec![
            FileRecord::new("a.jpg", 100, at(30)),
            FileRecord::new("b.jpeg", 50, at(10)),
            FileRecord::new("c.JPG", 200, at(20)),
            FileRecord::new("notes.txt", 1, at(5)),
        ]
        .into_iter()
        .collect();

        let canon = Canonicalizer::builtin().unwrap();
        let merged = summarize(table.into_stats(), &canon, SortOrder::Count);

        assert_eq!(merged.len(), 2);
        let jpeg = &merged[0];
        assert_eq!(jpeg.key, "jpeg");
        assert_eq!(jpeg.label(), "JPG,jpeg,jpg");
        assert_eq!(jpeg.count, 3);
        assert_eq!(jpeg.total_bytes, 350);
        assert_eq!(jpeg.min_size, 50);
        assert_eq!(jpeg.max_size, 200);
        assert_eq!(jpeg.oldest, at(10));
        assert_eq!(jpeg.newest, at(30));
        assert_eq!(jpeg.single_name(), None);

        assert_eq!(merged[1].single_name(), Some("notes.txt"));
    }

    #[test]
    fn test_merge_preserves_counts() {
        let names = ["a.htm", "b.html", "c.yml", "d.yaml", "e", "f.rs", "g.RS", "h.tif"];
        let table: ExtensionTable = names
            .iter()
            .map(|n| FileRecord::new(*n, 1, at(0)))
            .collect();

        let canon = Canonicalizer::builtin().unwrap();
        let merged = merge(table.into_stats(), &canon);

        let total: u64 = merged.iter().map(|s| s.count).sum();
        assert_eq!(total, names.len() as u64);
        assert!(merged.iter().any(|s| s.is_no_extension() && s.count == 1));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let table: ExtensionTable = ["a.jpg", "b.jpe", "c.md", "d.markdown", "e.zip"]
            .iter()
            .map(|n| FileRecord::new(*n, 3, at(1)))
            .collect();

        let canon = Canonicalizer::builtin().unwrap();
        let once = summarize(table.into_stats(), &canon, SortOrder::Count);
        let twice = summarize(once.clone(), &canon, SortOrder::Count);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_single_member_group_keeps_sample() {
        let table: ExtensionTable = vec![FileRecord::new("photo.jfif", 10, at(0))]
            .into_iter()
            .collect();
        let canon = Canonicalizer::builtin().unwrap();
        let merged = merge(table.into_stats(), &canon);
        assert_eq!(merged[0].key, "jpeg");
        assert_eq!(merged[0].single_name(), Some("photo.jfif"));
    }
}
