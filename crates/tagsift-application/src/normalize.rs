// SPDX-License-Identifier: GPL-3.0-or-later

//! Tag canonicalization.
//!
//! Raw provider tags are free text: mixed case, stray separators, synonym
//! spellings. Everything downstream (cache, scoring, bucket table) compares
//! canonical forms only, so normalization happens at the evidence boundary.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[/_]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Synonym spellings folded into one canonical form.
const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("hip hop", "hip-hop"),
    ("r&b", "rnb"),
    ("alt rock", "alternative rock"),
    ("alt-rock", "alternative rock"),
    ("synth pop", "synthpop"),
    ("indie pop", "indie-pop"),
    ("indie rock", "indie-rock"),
    ("electro pop", "electropop"),
    ("drum and bass", "drum & bass"),
    ("dnb", "drum & bass"),
    ("edm", "electronic"),
    ("emo pop", "emo-pop"),
    ("pop punk", "pop-punk"),
];

/// Tags that carry no genre signal: vague praise and origin words.
const DEFAULT_GENERIC_TAGS: &[&str] = &[
    "seen live",
    "favorite",
    "favorites",
    "best",
    "awesome",
    "good",
    "great",
    "all",
    "american",
    "british",
    "canadian",
    "uk",
    "usa",
    "united states",
];

/// Canonicalizes raw tags and recognizes generic (signal-free) ones.
///
/// Tables are immutable after construction; tests can substitute their own.
#[derive(Debug, Clone)]
pub struct TagNormalizer {
    synonyms: HashMap<String, String>,
    generic: HashSet<String>,
}

impl Default for TagNormalizer {
    fn default() -> Self {
        Self::with_tables(
            DEFAULT_SYNONYMS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string())),
            DEFAULT_GENERIC_TAGS.iter().map(|tag| tag.to_string()),
        )
    }
}

impl TagNormalizer {
    pub fn with_tables(
        synonyms: impl IntoIterator<Item = (String, String)>,
        generic: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            synonyms: synonyms.into_iter().collect(),
            generic: generic.into_iter().collect(),
        }
    }

    /// Canonicalize a raw tag: trim, lowercase, collapse `/`, `_` and
    /// whitespace runs to single spaces, then apply the synonym table.
    ///
    /// Idempotent: normalizing an already-normalized tag is a no-op. Never
    /// returns empty output for non-whitespace input.
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        let separated = SEPARATORS.replace_all(&lowered, " ");
        let collapsed = WHITESPACE.replace_all(separated.trim(), " ").into_owned();

        match self.synonyms.get(&collapsed) {
            Some(canonical) => canonical.clone(),
            None => collapsed,
        }
    }

    /// Whether a tag (in any spelling) is in the generic set.
    pub fn is_generic(&self, tag: &str) -> bool {
        self.generic.contains(&self.normalize(tag))
    }

    /// Normalize a raw tag list, drop generic and empty tags, and dedupe
    /// preserving first-seen order.
    pub fn canonical_tags<I, S>(&self, raw: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for tag in raw {
            let canonical = self.normalize(tag.as_ref());
            if canonical.is_empty() || self.generic.contains(&canonical) {
                continue;
            }
            if seen.insert(canonical.clone()) {
                out.push(canonical);
            }
        }
        out
    }
}
