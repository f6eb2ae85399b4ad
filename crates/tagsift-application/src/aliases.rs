// SPDX-License-Identifier: GPL-3.0-or-later

//! Curated artist aliases.
//!
//! Some artists are chronically untagged or mistagged upstream; the alias
//! table pins their tags by exact display name. Checked only after catalog
//! evidence has come up empty.

use std::collections::HashMap;

const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("Macklemore", &["hip-hop", "rap"]),
    ("Macklemore & Ryan Lewis", &["hip-hop", "rap"]),
    ("Two Steps From Hell", &["orchestral", "soundtrack"]),
    ("The Piano Guys", &["classical crossover", "piano"]),
    ("Original Broadway Cast", &["musical", "broadway"]),
];

/// Exact display-name → fixed tag list mapping, immutable after construction.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<String, Vec<String>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::with_entries(DEFAULT_ALIASES.iter().map(|(name, tags)| {
            (
                name.to_string(),
                tags.iter().map(|tag| tag.to_string()).collect(),
            )
        }))
    }
}

impl AliasTable {
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Tags for an exact display name, if curated.
    pub fn lookup(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }
}
