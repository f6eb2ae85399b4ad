// SPDX-License-Identifier: GPL-3.0-or-later

//! Evidence aggregation and track scoring.
//!
//! One track at a time, one artist at a time: resolve each artist's tags
//! through the cache and the catalog, weight them by source confidence and
//! artist role, and accumulate additively per tag. Only when the whole
//! track comes up empty do the fallback tiers fire, each tier covering all
//! of the track's artists before escalating to the next.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tagsift_config::{EvidenceOptions, WeightsConfig};
use tagsift_domain::{ArtistRef, ClassificationResult, ScoredTag, Track};
use tagsift_spotify::client::MAX_BATCH_IDS;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::aliases::AliasTable;
use crate::buckets::BucketClassifier;
use crate::cache::TagCache;
use crate::diagnostics::{DiagnosticCategory, DiagnosticsCollector};
use crate::heuristics::NameHeuristics;
use crate::normalize::TagNormalizer;
use crate::sources::{
    AliasSource, Catalog, CatalogIdSource, CatalogSearchSource, EvidenceSource, ExternalTagSource,
    HeuristicSource, RelatedSource, SourceKind, TagService,
};

/// Delay before the single batch-lookup retry.
const BATCH_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Scores tracks by aggregating weighted tag evidence across their artists.
pub struct TrackScorer {
    catalog: Arc<dyn Catalog>,
    id_source: CatalogIdSource,
    search_source: CatalogSearchSource,
    fallback_tiers: Vec<Box<dyn EvidenceSource>>,
    normalizer: Arc<TagNormalizer>,
    classifier: BucketClassifier,
    cache: TagCache,
    weights: WeightsConfig,
    options: EvidenceOptions,
    diagnostics: DiagnosticsCollector,
}

impl TrackScorer {
    /// Assemble a scorer with default tables. The fallback tier order is
    /// fixed: alias → name heuristics → related inference (if enabled) →
    /// external tags (if enabled and a service is supplied).
    pub fn new(
        catalog: Arc<dyn Catalog>,
        tag_service: Option<Arc<dyn TagService>>,
        cache: TagCache,
        weights: WeightsConfig,
        options: EvidenceOptions,
    ) -> Self {
        let normalizer = Arc::new(TagNormalizer::default());
        let aliases = Arc::new(AliasTable::default());
        let heuristics = Arc::new(NameHeuristics);

        let mut fallback_tiers: Vec<Box<dyn EvidenceSource>> = vec![
            Box::new(AliasSource::new(aliases, normalizer.clone())),
            Box::new(HeuristicSource::new(heuristics)),
        ];

        if options.infer_related {
            fallback_tiers.push(Box::new(RelatedSource::new(
                catalog.clone(),
                normalizer.clone(),
            )));
        }

        if options.use_musicbrainz {
            if let Some(service) = tag_service {
                fallback_tiers.push(Box::new(ExternalTagSource::new(
                    service,
                    normalizer.clone(),
                )));
            } else {
                warn!(
                    target: "scorer",
                    "external tag service enabled but no client supplied, tier skipped"
                );
            }
        }

        Self {
            id_source: CatalogIdSource::new(catalog.clone(), normalizer.clone()),
            search_source: CatalogSearchSource::new(catalog.clone(), normalizer.clone()),
            catalog,
            fallback_tiers,
            normalizer,
            classifier: BucketClassifier::default(),
            cache,
            weights,
            options,
            diagnostics: DiagnosticsCollector::new(),
        }
    }

    fn role_weight(&self, index: usize) -> f32 {
        if index == 0 {
            self.weights.role_primary
        } else {
            self.weights.role_featured
        }
    }

    fn source_weight(&self, kind: SourceKind) -> f32 {
        match kind {
            SourceKind::CatalogLookup | SourceKind::CatalogSearch => self.weights.catalog,
            SourceKind::Alias => self.weights.alias,
            SourceKind::NameHeuristic => self.weights.heuristic,
            SourceKind::Related => self.weights.related,
            SourceKind::ExternalTags => self.weights.external,
        }
    }

    /// Resolve one artist's canonical tag set: cache first, then catalog id
    /// lookup, then catalog name search. The result is written back to the
    /// cache even when empty; an empty set is a fact worth remembering.
    async fn resolve_artist(&mut self, artist: &ArtistRef) -> Vec<String> {
        match &artist.id {
            Some(id) => {
                if let Some(tags) = self.cache.get(id, Utc::now()) {
                    debug!(target: "scorer", artist = %artist.name, "cache hit");
                    return tags;
                }

                let mut tags = self.id_source.lookup(artist, &mut self.diagnostics).await;
                if tags.is_empty() {
                    tags = self
                        .search_source
                        .lookup(artist, &mut self.diagnostics)
                        .await;
                }

                self.cache.put(id, tags.clone(), Utc::now());
                tags
            }
            // no id: nothing to cache under, go straight to name search
            None => {
                self.search_source
                    .lookup(artist, &mut self.diagnostics)
                    .await
            }
        }
    }

    /// Score a track and classify it into its bucket.
    pub async fn score_track(&mut self, track: &Track) -> ClassificationResult {
        let mut totals: HashMap<String, f32> = HashMap::new();

        let considered = if self.options.use_all_artists {
            track.artists.len()
        } else {
            1
        };

        for (index, artist) in track.artists.iter().enumerate().take(considered) {
            if !artist.is_resolvable() {
                continue;
            }
            let weight = self.weights.catalog * self.role_weight(index);
            for tag in self.resolve_artist(artist).await {
                *totals.entry(tag).or_default() += weight;
            }
        }

        if totals.is_empty() {
            self.escalate(track, &mut totals).await;
        }

        let mut tags: Vec<ScoredTag> = totals
            .into_iter()
            .map(|(tag, score)| ScoredTag::new(tag, score))
            .collect();
        tags.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.tag.cmp(&b.tag)));

        let bucket = self.classifier.classify(&tags);
        debug!(
            target: "scorer",
            track = %track.name,
            bucket = %bucket,
            evidence = tags.len(),
            "track classified"
        );

        ClassificationResult {
            primary_artist_id: track.primary_artist_id().cloned(),
            tags,
            bucket,
        }
    }

    /// Run the fallback tiers in order, each over all of the track's
    /// artists, stopping at the first tier that produces any evidence.
    async fn escalate(&mut self, track: &Track, totals: &mut HashMap<String, f32>) {
        for tier_index in 0..self.fallback_tiers.len() {
            let kind = self.fallback_tiers[tier_index].kind();
            let source_weight = self.source_weight(kind);

            for (index, artist) in track.artists.iter().enumerate() {
                if !artist.is_resolvable() {
                    continue;
                }
                let weight = source_weight * self.role_weight(index);
                let tier = &self.fallback_tiers[tier_index];
                for tag in tier.lookup(artist, &mut self.diagnostics).await {
                    *totals.entry(tag).or_default() += weight;
                }
            }

            if !totals.is_empty() {
                debug!(
                    target: "scorer",
                    track = %track.name,
                    tier = %kind,
                    "fallback tier produced evidence"
                );
                return;
            }
        }
    }

    /// Opportunistically warm the cache with batched catalog lookups before
    /// scoring. One bounded retry per failed batch; a batch that fails twice
    /// marks all of its ids as having empty evidence.
    pub async fn prime_cache(&mut self, tracks: &[Track]) {
        let now = Utc::now();
        let mut seen = HashSet::new();
        let mut pending: Vec<ArtistRef> = Vec::new();

        for track in tracks {
            for artist in &track.artists {
                let Some(id) = &artist.id else { continue };
                if seen.insert(id.clone()) && self.cache.get(id, now).is_none() {
                    pending.push(artist.clone());
                }
            }
        }

        if pending.is_empty() {
            return;
        }
        info!(target: "scorer", artists = pending.len(), "priming cache");

        for chunk in pending.chunks(MAX_BATCH_IDS) {
            let ids: Vec<_> = chunk.iter().filter_map(|a| a.id.clone()).collect();

            let found = match self.catalog.lookup_many(&ids).await {
                Ok(found) => found,
                Err(error) => {
                    warn!(
                        target: "scorer",
                        error = %error,
                        "batch lookup failed, retrying once"
                    );
                    sleep(BATCH_RETRY_DELAY).await;
                    match self.catalog.lookup_many(&ids).await {
                        Ok(found) => found,
                        Err(error) => {
                            for artist in chunk {
                                self.diagnostics.record(
                                    (&artist.id, &artist.name),
                                    SourceKind::CatalogLookup,
                                    DiagnosticCategory::ProviderError,
                                    error.to_string(),
                                );
                                if let Some(id) = &artist.id {
                                    self.cache.put(id, Vec::new(), Utc::now());
                                }
                            }
                            continue;
                        }
                    }
                }
            };

            let by_id: HashMap<&str, &tagsift_spotify::CatalogArtist> =
                found.iter().map(|a| (a.id.as_str(), a)).collect();

            for artist in chunk {
                let Some(id) = &artist.id else { continue };
                // ids the batch could not resolve are left uncached so the
                // per-artist path can still fall back to name search
                if let Some(record) = by_id.get(id.as_str()) {
                    let tags = self.normalizer.canonical_tags(record.genres.clone());
                    self.cache.put(id, tags, Utc::now());
                }
            }
        }
    }

    pub fn diagnostics(&self) -> &DiagnosticsCollector {
        &self.diagnostics
    }

    /// Persist the cache and hand back the run's diagnostics.
    pub fn finish(self) -> DiagnosticsCollector {
        self.cache.save();
        let summary = self.diagnostics.summary();
        info!(target: "scorer", %summary, "run complete");
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tagsift_domain::{ArtistId, Bucket, TrackId};
    use tagsift_spotify::{CatalogArtist, SpotifyError};
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeCatalog {
        by_id: HashMap<String, CatalogArtist>,
        by_name: HashMap<String, CatalogArtist>,
        batch_failures: AtomicUsize,
        batch_calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn with_artist(mut self, id: &str, name: &str, genres: &[&str]) -> Self {
            let artist = CatalogArtist {
                id: id.to_string(),
                name: name.to_string(),
                genres: genres.iter().map(|g| g.to_string()).collect(),
                popularity: Some(50),
            };
            self.by_name.insert(name.to_string(), artist.clone());
            self.by_id.insert(id.to_string(), artist);
            self
        }

        fn failing_batches(self, failures: usize) -> Self {
            self.batch_failures.store(failures, Ordering::SeqCst);
            self
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn lookup_by_id(
            &self,
            id: &ArtistId,
        ) -> Result<Option<CatalogArtist>, SpotifyError> {
            Ok(self.by_id.get(id.as_str()).cloned())
        }

        async fn lookup_many(&self, ids: &[ArtistId]) -> Result<Vec<CatalogArtist>, SpotifyError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            if self.batch_failures.load(Ordering::SeqCst) > 0 {
                self.batch_failures.fetch_sub(1, Ordering::SeqCst);
                return Err(SpotifyError::RateLimitExceeded);
            }
            Ok(ids
                .iter()
                .filter_map(|id| self.by_id.get(id.as_str()).cloned())
                .collect())
        }

        async fn search_by_name(&self, name: &str) -> Result<Option<CatalogArtist>, SpotifyError> {
            Ok(self.by_name.get(name).cloned())
        }

        async fn related_of(&self, _id: &ArtistId) -> Result<Vec<CatalogArtist>, SpotifyError> {
            Ok(Vec::new())
        }
    }

    fn track(artists: &[(Option<&str>, &str)]) -> Track {
        Track {
            id: TrackId::new("t1"),
            name: "Test Track".to_string(),
            album: "Test Album".to_string(),
            artists: artists
                .iter()
                .map(|(id, name)| ArtistRef::new(id.map(ArtistId::new), *name))
                .collect(),
        }
    }

    fn scorer_with(catalog: FakeCatalog, options: EvidenceOptions) -> (TrackScorer, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let cache = TagCache::empty(dir.path().join("cache.json"), chrono::Duration::days(14));
        let scorer = TrackScorer::new(
            Arc::new(catalog),
            None,
            cache,
            WeightsConfig::default(),
            options,
        );
        (scorer, dir)
    }

    #[tokio::test]
    async fn primary_artist_outweighs_featured_at_equal_confidence() {
        let catalog = FakeCatalog::default()
            .with_artist("a1", "Primary Act", &["trap"])
            .with_artist("a2", "Featured Act", &["classical", "baroque"]);
        let options = EvidenceOptions {
            use_all_artists: true,
            ..Default::default()
        };
        let (mut scorer, _dir) = scorer_with(catalog, options);

        // primary: trap 1.0; featured: classical 0.5 + baroque 0.5 = 1.0 tie
        // preference order puts hip-hop ahead of classical
        let result = scorer
            .score_track(&track(&[
                (Some("a1"), "Primary Act"),
                (Some("a2"), "Featured Act"),
            ]))
            .await;
        assert_eq!(result.bucket, Bucket::HipHop);
    }

    #[tokio::test]
    async fn featured_needs_more_than_double_evidence_to_win() {
        let catalog = FakeCatalog::default()
            .with_artist("a1", "Primary Act", &["trap"])
            .with_artist("a2", "Featured Act", &["classical", "baroque", "opera"]);
        let options = EvidenceOptions {
            use_all_artists: true,
            ..Default::default()
        };
        let (mut scorer, _dir) = scorer_with(catalog, options);

        // featured total 1.5 > 2 x 0.5: classical wins
        let result = scorer
            .score_track(&track(&[
                (Some("a1"), "Primary Act"),
                (Some("a2"), "Featured Act"),
            ]))
            .await;
        assert_eq!(result.bucket, Bucket::Classical);
    }

    #[tokio::test]
    async fn featured_artists_ignored_unless_enabled() {
        let catalog = FakeCatalog::default()
            .with_artist("a1", "Primary Act", &["country"])
            .with_artist("a2", "Featured Act", &["trap", "drill", "rap"]);
        let (mut scorer, _dir) = scorer_with(catalog, EvidenceOptions::default());

        let result = scorer
            .score_track(&track(&[
                (Some("a1"), "Primary Act"),
                (Some("a2"), "Featured Act"),
            ]))
            .await;
        assert_eq!(result.bucket, Bucket::Country);
    }

    #[tokio::test]
    async fn id_lookup_falls_back_to_name_search() {
        let mut catalog = FakeCatalog::default().with_artist("other", "Primary Act", &["grunge"]);
        // the track's id is unknown to the catalog, only the name matches
        catalog.by_id.remove("other");
        let (mut scorer, _dir) = scorer_with(catalog, EvidenceOptions::default());

        let result = scorer
            .score_track(&track(&[(Some("missing"), "Primary Act")]))
            .await;
        assert_eq!(result.bucket, Bucket::Rock);
        // the id miss was recorded
        assert_eq!(scorer.diagnostics().summary().not_found, 1);
    }

    #[tokio::test]
    async fn empty_results_are_cached_until_ttl() {
        let catalog = FakeCatalog::default();
        let (mut scorer, _dir) = scorer_with(catalog, EvidenceOptions::default());

        let t = track(&[(Some("a1"), "Unknown Act")]);
        scorer.score_track(&t).await;
        let first_diags = scorer.diagnostics().entries().len();

        // second scoring hits the cached empty set, no new provider calls
        scorer.score_track(&t).await;
        assert_eq!(scorer.diagnostics().entries().len(), first_diags);
    }

    #[tokio::test]
    async fn alias_tier_fires_when_catalog_is_empty() {
        let catalog = FakeCatalog::default();
        let (mut scorer, _dir) = scorer_with(catalog, EvidenceOptions::default());

        let result = scorer
            .score_track(&track(&[(Some("a1"), "Macklemore")]))
            .await;
        assert_eq!(result.bucket, Bucket::HipHop);
        let tags: Vec<&str> = result.tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["hip-hop", "rap"]);
    }

    #[tokio::test]
    async fn heuristic_tier_fires_after_alias_tier() {
        let catalog = FakeCatalog::default();
        let (mut scorer, _dir) = scorer_with(catalog, EvidenceOptions::default());

        let result = scorer
            .score_track(&track(&[(Some("a1"), "Boston Symphony Orchestra")]))
            .await;
        assert_eq!(result.bucket, Bucket::Classical);
    }

    #[tokio::test]
    async fn scoring_is_deterministic_for_fixed_evidence() {
        let catalog = FakeCatalog::default()
            .with_artist("a1", "Primary Act", &["trap", "drill", "house"]);
        let (mut scorer, _dir) = scorer_with(catalog, EvidenceOptions::default());

        let t = track(&[(Some("a1"), "Primary Act")]);
        let first = scorer.score_track(&t).await;
        let second = scorer.score_track(&t).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn prime_cache_retries_failed_batches_once() {
        let catalog = FakeCatalog::default()
            .with_artist("a1", "Primary Act", &["trap"])
            .failing_batches(1);
        let (mut scorer, _dir) = scorer_with(catalog, EvidenceOptions::default());

        let tracks = vec![track(&[(Some("a1"), "Primary Act")])];
        scorer.prime_cache(&tracks).await;

        // retry succeeded and the entry is cached: scoring needs no lookups
        let result = scorer.score_track(&tracks[0]).await;
        assert_eq!(result.bucket, Bucket::HipHop);
        assert!(scorer.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn prime_cache_marks_twice_failed_batches_empty() {
        let catalog = FakeCatalog::default()
            .with_artist("a1", "Macklemore", &["hip hop"])
            .failing_batches(2);
        let (mut scorer, _dir) = scorer_with(catalog, EvidenceOptions::default());

        let tracks = vec![track(&[(Some("a1"), "Macklemore")])];
        scorer.prime_cache(&tracks).await;
        assert_eq!(scorer.diagnostics().summary().errors, 1);

        // the id now has cached empty evidence; the alias tier still rescues
        // the track because fallback applies to accumulated track evidence
        let result = scorer.score_track(&tracks[0]).await;
        assert_eq!(result.bucket, Bucket::HipHop);
    }
}
