// SPDX-License-Identifier: GPL-3.0-or-later

//! Core genre-classification pipeline.
//!
//! Combines noisy per-artist tag evidence from multiple sources into a
//! single deterministic bucket per track: tag normalization, a TTL-bounded
//! per-artist evidence cache, an ordered provider fallback protocol with
//! confidence weighting, and a scored bucket classifier.

pub mod aliases;
pub mod buckets;
pub mod cache;
pub mod diagnostics;
pub mod heuristics;
pub mod normalize;
pub mod scorer;
pub mod sources;

pub use aliases::AliasTable;
pub use buckets::BucketClassifier;
pub use cache::TagCache;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticsCollector};
pub use heuristics::NameHeuristics;
pub use normalize::TagNormalizer;
pub use scorer::TrackScorer;
pub use sources::{Catalog, EvidenceSource, SourceKind, TagService};
