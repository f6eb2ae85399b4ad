// SPDX-License-Identifier: GPL-3.0-or-later

//! Scored bucket classification.
//!
//! Canonical tags map many-to-one into the closed bucket set; per-bucket
//! scores are summed and the highest wins, with ties broken by the fixed
//! preference order declared on [`Bucket`]. The older first-substring-match
//! policy is kept as [`BucketClassifier::legacy_substring_bucket`] for
//! comparison; the scored policy is canonical and the two are never merged.

use std::collections::HashMap;

use tagsift_domain::{Bucket, ScoredTag};
use tracing::debug;

/// Canonical tag → bucket table. Keys are normalized tag spellings; tags
/// absent from the table contribute nothing to any bucket.
const DEFAULT_CANONICAL_TABLE: &[(&str, Bucket)] = &[
    // rock and its many shards
    ("rock", Bucket::Rock),
    ("classic rock", Bucket::Rock),
    ("hard rock", Bucket::Rock),
    ("soft rock", Bucket::Rock),
    ("glam rock", Bucket::Rock),
    ("roots rock", Bucket::Rock),
    ("arena rock", Bucket::Rock),
    ("modern rock", Bucket::Rock),
    ("alternative rock", Bucket::Rock),
    ("indie-rock", Bucket::Rock),
    ("garage rock", Bucket::Rock),
    ("psychedelic rock", Bucket::Rock),
    ("grunge", Bucket::Rock),
    ("punk", Bucket::Rock),
    ("pop-punk", Bucket::Rock),
    ("skate punk", Bucket::Rock),
    ("hardcore punk", Bucket::Rock),
    ("emo", Bucket::Rock),
    ("emo-pop", Bucket::Rock),
    ("ska", Bucket::Rock),
    ("ska punk", Bucket::Rock),
    ("metal", Bucket::Rock),
    ("metalcore", Bucket::Rock),
    ("deathcore", Bucket::Rock),
    ("death metal", Bucket::Rock),
    ("nu metal", Bucket::Rock),
    ("thrash metal", Bucket::Rock),
    ("black metal", Bucket::Rock),
    ("prog metal", Bucket::Rock),
    // country and adjacent roots music
    ("country", Bucket::Country),
    ("alt-country", Bucket::Country),
    ("folk", Bucket::Country),
    ("americana", Bucket::Country),
    ("singer-songwriter", Bucket::Country),
    ("bluegrass", Bucket::Country),
    // hip-hop
    ("hip-hop", Bucket::HipHop),
    ("rap", Bucket::HipHop),
    ("trap", Bucket::HipHop),
    ("drill", Bucket::HipHop),
    ("grime", Bucket::HipHop),
    ("emo rap", Bucket::HipHop),
    // classical
    ("classical", Bucket::Classical),
    ("baroque", Bucket::Classical),
    ("romantic era", Bucket::Classical),
    ("orchestral", Bucket::Classical),
    ("opera", Bucket::Classical),
    ("piano", Bucket::Classical),
    ("chamber music", Bucket::Classical),
    ("choral", Bucket::Classical),
    ("classical crossover", Bucket::Classical),
    // stage and screen
    ("musical", Bucket::Musical),
    ("musicals", Bucket::Musical),
    ("broadway", Bucket::Musical),
    ("show tunes", Bucket::Musical),
    ("cast recording", Bucket::Musical),
    ("soundtrack", Bucket::Musical),
    ("score", Bucket::Musical),
    ("ost", Bucket::Musical),
    // electronic
    ("electronic", Bucket::Electronic),
    ("house", Bucket::Electronic),
    ("techno", Bucket::Electronic),
    ("trance", Bucket::Electronic),
    ("dubstep", Bucket::Electronic),
    ("electro", Bucket::Electronic),
    ("synthwave", Bucket::Electronic),
    ("synthpop", Bucket::Electronic),
    ("electropop", Bucket::Electronic),
    ("drum & bass", Bucket::Electronic),
    ("idm", Bucket::Electronic),
    ("downtempo", Bucket::Electronic),
];

/// Ordered substring rules of the legacy first-match policy. Rule order is
/// load-bearing: the first needle found in any tag decides the bucket.
const LEGACY_SUBSTRING_RULES: &[(Bucket, &[&str])] = &[
    (Bucket::Rock, &["pop punk", "pop-punk"]),
    (Bucket::Rock, &["punk", "skate punk", "hardcore punk"]),
    (Bucket::Rock, &["emo", "emo-pop"]),
    (Bucket::Rock, &["ska"]),
    (Bucket::Rock, &["alternative rock", "alt rock", "alt-rock", "modern rock"]),
    (Bucket::Rock, &["indie rock", "indie-rock"]),
    (Bucket::Rock, &["metal", "metalcore", "deathcore", "death metal"]),
    (Bucket::Rock, &["hard rock", "arena rock"]),
    (Bucket::Rock, &["rock"]),
    (Bucket::Electronic, &["electronic", "edm", "house", "techno", "trance", "dubstep", "synthpop"]),
    (Bucket::HipHop, &["hip hop", "hip-hop", "rap"]),
    (Bucket::Country, &["country", "alt-country"]),
    (Bucket::Country, &["folk", "americana", "singer-songwriter"]),
    (Bucket::Musical, &["soundtrack", "score", "ost", "broadway"]),
    (Bucket::Classical, &["classical", "baroque", "orchestral", "piano"]),
];

/// Maps accumulated per-tag scores to one bucket.
#[derive(Debug, Clone)]
pub struct BucketClassifier {
    table: HashMap<String, Bucket>,
}

impl Default for BucketClassifier {
    fn default() -> Self {
        Self::with_table(
            DEFAULT_CANONICAL_TABLE
                .iter()
                .map(|(tag, bucket)| (tag.to_string(), *bucket)),
        )
    }
}

impl BucketClassifier {
    pub fn with_table(table: impl IntoIterator<Item = (String, Bucket)>) -> Self {
        Self {
            table: table.into_iter().collect(),
        }
    }

    /// Bucket for a single canonical tag, if the table maps it.
    pub fn bucket_for_tag(&self, tag: &str) -> Option<Bucket> {
        self.table.get(tag).copied()
    }

    /// Classify weighted evidence: sum scores per bucket, highest wins,
    /// ties go to the bucket earliest in the preference order. No mapped
    /// tag at all yields [`Bucket::Other`].
    pub fn classify(&self, weighted_tags: &[ScoredTag]) -> Bucket {
        let mut totals = [0.0f32; Bucket::ALL.len()];
        let mut any = false;

        for scored in weighted_tags {
            if let Some(bucket) = self.table.get(&scored.tag) {
                totals[bucket.preference()] += scored.score;
                any = true;
            }
        }

        if !any {
            return Bucket::Other;
        }

        // Strict comparison keeps the earliest bucket on ties, which is
        // exactly the preference order since `totals` is indexed by it.
        let mut winner = 0;
        for (index, total) in totals.iter().enumerate() {
            if *total > totals[winner] {
                winner = index;
            }
        }

        let bucket = Bucket::ALL[winner];
        debug!(target: "classifier", bucket = %bucket, totals = ?totals, "scored classification");
        bucket
    }

    /// Legacy first-substring-match policy, retained for comparison only.
    ///
    /// Scans the fixed rule list in order and returns the bucket of the
    /// first needle found as a substring of any tag. Ignores weights
    /// entirely; agreement with [`Self::classify`] is coincidental.
    pub fn legacy_substring_bucket(&self, tags: &[String]) -> Bucket {
        for (bucket, needles) in LEGACY_SUBSTRING_RULES {
            for tag in tags {
                for needle in *needles {
                    if tag.contains(needle) {
                        return *bucket;
                    }
                }
            }
        }
        Bucket::Other
    }
}
