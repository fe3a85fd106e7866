//! Extension canonicalization
//!
//! Several raw extensions often name the same kind of file (`jpg`, `jpeg`,
//! `jpe`...). The [`Canonicalizer`] maps every raw extension onto a group key
//! so those files share a single report row.
//!
//! The table is checked when the canonicalizer is built: every group must
//! list its own key, and no extension may belong to two groups.

use crate::error::CanonicalError;
use std::collections::HashMap;

/// A group key and its member extensions
pub type ExtensionGroup = (&'static str, &'static [&'static str]);

/// Built-in extension groups
pub const EXTENSION_GROUPS: &[ExtensionGroup] = &[
    ("jpeg", &["jpg", "jpeg", "jpe", "jif", "jfif", "jfi"]),
    ("tiff", &["tif", "tiff"]),
    ("heic", &["heic", "heif"]),
    ("mpeg", &["mpg", "mpeg", "mpe", "m1v", "m2v"]),
    ("midi", &["mid", "midi"]),
    ("aiff", &["aif", "aiff", "aifc"]),
    ("html", &["htm", "html"]),
    ("yaml", &["yml", "yaml"]),
    ("md", &["md", "markdown", "mdown", "mkd"]),
    ("txt", &["txt", "text"]),
    ("cpp", &["cpp", "cc", "cxx", "c++"]),
    ("hpp", &["hpp", "hh", "hxx", "h++"]),
    ("js", &["js", "mjs", "cjs"]),
    ("ts", &["ts", "mts", "cts"]),
    ("bz2", &["bz2", "bzip2"]),
];

/// Maps raw extensions to their group keys
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    groups: HashMap<String, String>,
}

impl Canonicalizer {
    /// Build from a table of groups, validating its structure
    pub fn new<'a, I, M>(groups: I) -> Result<Self, CanonicalError>
    where
        I: IntoIterator<Item = (&'a str, M)>,
        M: IntoIterator<Item = &'a str>,
    {
        let mut map: HashMap<String, String> = HashMap::new();

        for (key, members) in groups {
            let mut has_key = false;

            for member in members {
                has_key |= member == key;

                if let Some(existing) = map.get(member) {
                    if existing != key {
                        return Err(CanonicalError::DuplicateMember {
                            extension: member.to_string(),
                            first: existing.clone(),
                            second: key.to_string(),
                        });
                    }
                    continue;
                }
                map.insert(member.to_string(), key.to_string());
            }

            if !has_key {
                return Err(CanonicalError::KeyNotMember {
                    group: key.to_string(),
                });
            }
        }

        Ok(Self { groups: map })
    }

    /// Build from [`EXTENSION_GROUPS`]
    pub fn builtin() -> Result<Self, CanonicalError> {
        Self::new(
            EXTENSION_GROUPS
                .iter()
                .map(|(key, members)| (*key, members.iter().copied())),
        )
    }

    /// An identity mapping: every extension is its own group
    pub fn identity() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    /// Group key for a raw extension
    ///
    /// Exact match first, then a lowercased match; anything else is its
    /// own group.
    pub fn canonicalize<'a>(&'a self, raw: &'a str) -> &'a str {
        if let Some(key) = self.groups.get(raw) {
            return key;
        }
        let lower = raw.to_lowercase();
        if lower != raw {
            if let Some(key) = self.groups.get(&lower) {
                return key;
            }
        }
        raw
    }

    /// Number of extensions with an explicit group
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
