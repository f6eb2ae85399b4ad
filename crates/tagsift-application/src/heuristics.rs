// SPDX-License-Identifier: GPL-3.0-or-later

//! Name-based heuristics (low-confidence fallback).
//!
//! Pattern checks against the artist's display name for the two genres
//! where naming conventions are strong enough to be usable evidence:
//! classical ensembles/composers and stage-musical cast recordings.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    // Ensemble words that essentially only classical acts use
    static ref CLASSICAL_ENSEMBLE: Regex = Regex::new(
        r"(?i)\b(orchestra|philharmonic|symphony|sinfonia|quartet|ensemble|chamber|choir)\b"
    )
    .unwrap();

    // Canonical composer surnames, matched as whole words
    static ref COMPOSER_NAME: Regex = Regex::new(
        r"(?i)\b(bach|beethoven|mozart|chopin|tchaikovsky|vivaldi|brahms|debussy|handel|haydn|schubert|rachmaninoff|liszt)\b"
    )
    .unwrap();

    static ref MUSICAL_CAST: Regex = Regex::new(
        r"(?i)\b(broadway|cast recording|original cast|west end cast)\b"
    )
    .unwrap();
}

/// Display-name pattern rules producing canonical tags directly.
#[derive(Debug, Default, Clone)]
pub struct NameHeuristics;

impl NameHeuristics {
    /// Tags implied by the artist's display name. Empty when no rule fires.
    pub fn tags_for_name(&self, name: &str) -> Vec<String> {
        let mut tags = Vec::new();

        if CLASSICAL_ENSEMBLE.is_match(name) || COMPOSER_NAME.is_match(name) {
            tags.push("classical".to_string());
        }
        if MUSICAL_CAST.is_match(name) {
            tags.push("musical".to_string());
        }

        if !tags.is_empty() {
            debug!(
                target: "heuristics",
                artist = %name,
                tags = ?tags,
                "name heuristic matched"
            );
        }

        tags
    }
}
