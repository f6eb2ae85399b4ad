// SPDX-License-Identifier: GPL-3.0-or-later

//! Evidence sources and their fallback seams.
//!
//! Every way of learning tags about an artist is one [`EvidenceSource`]
//! behind a uniform lookup contract: a list of canonical tags, possibly
//! empty, never an error. Transport failures stop at the source boundary
//! and become diagnostics. The scorer depends only on the trait and an
//! explicit ordering, so sources can be added or reordered without
//! touching aggregation logic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tagsift_domain::{ArtistId, ArtistRef};
use tagsift_musicbrainz::{MusicBrainzClient, MusicBrainzError};
use tagsift_spotify::{CatalogArtist, SpotifyClient, SpotifyError};
use tracing::debug;
use uuid::Uuid;

use crate::aliases::AliasTable;
use crate::diagnostics::{DiagnosticCategory, DiagnosticsCollector};
use crate::heuristics::NameHeuristics;
use crate::normalize::TagNormalizer;

/// How many related artists contribute to pooled inference.
const RELATED_POOL_LIMIT: usize = 10;
/// How many of the most frequent pooled tags are kept.
const RELATED_TOP_TAGS: usize = 3;

/// Identifies which strategy produced a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    CatalogLookup,
    CatalogSearch,
    Alias,
    NameHeuristic,
    Related,
    ExternalTags,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatalogLookup => "catalog-lookup",
            Self::CatalogSearch => "catalog-search",
            Self::Alias => "alias",
            Self::NameHeuristic => "name-heuristic",
            Self::Related => "related",
            Self::ExternalTags => "external-tags",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// External collaborator seams
// ============================================================================

/// Primary-catalog operations consumed by evidence sources.
///
/// `Ok(None)` / empty means the catalog answered but has nothing; `Err`
/// means the call itself failed. Sources translate both into empty
/// evidence plus the matching diagnostic category.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn lookup_by_id(&self, id: &ArtistId) -> Result<Option<CatalogArtist>, SpotifyError>;
    async fn lookup_many(&self, ids: &[ArtistId]) -> Result<Vec<CatalogArtist>, SpotifyError>;
    async fn search_by_name(&self, name: &str) -> Result<Option<CatalogArtist>, SpotifyError>;
    async fn related_of(&self, id: &ArtistId) -> Result<Vec<CatalogArtist>, SpotifyError>;
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn lookup_by_id(&self, id: &ArtistId) -> Result<Option<CatalogArtist>, SpotifyError> {
        match self.artist(id.as_str()).await {
            Ok(artist) => Ok(Some(artist)),
            Err(SpotifyError::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn lookup_many(&self, ids: &[ArtistId]) -> Result<Vec<CatalogArtist>, SpotifyError> {
        let raw: Vec<&str> = ids.iter().map(ArtistId::as_str).collect();
        self.artists(&raw).await
    }

    async fn search_by_name(&self, name: &str) -> Result<Option<CatalogArtist>, SpotifyError> {
        self.search_artist(name).await
    }

    async fn related_of(&self, id: &ArtistId) -> Result<Vec<CatalogArtist>, SpotifyError> {
        match self.related_artists(id.as_str()).await {
            Ok(artists) => Ok(artists),
            Err(SpotifyError::NotFound(_)) => Ok(Vec::new()),
            Err(error) => Err(error),
        }
    }
}

/// Community tag service (secondary provider) consumed by the external
/// tag source.
#[async_trait]
pub trait TagService: Send + Sync {
    /// Resolve an artist name to an external id, best match first.
    async fn search_artist(&self, name: &str) -> Result<Option<Uuid>, MusicBrainzError>;
    /// Raw tag names for an external id.
    async fn artist_tags(&self, id: Uuid) -> Result<Vec<String>, MusicBrainzError>;
}

#[async_trait]
impl TagService for MusicBrainzClient {
    async fn search_artist(&self, name: &str) -> Result<Option<Uuid>, MusicBrainzError> {
        Ok(self.search_best_artist(name).await?.map(|artist| artist.id))
    }

    async fn artist_tags(&self, id: Uuid) -> Result<Vec<String>, MusicBrainzError> {
        match MusicBrainzClient::artist_tags(self, id).await {
            Ok(tags) => Ok(tags),
            Err(MusicBrainzError::NotFound(_)) => Ok(Vec::new()),
            Err(error) => Err(error),
        }
    }
}

// ============================================================================
// Evidence sources
// ============================================================================

/// One strategy for obtaining canonical tag evidence about an artist.
///
/// Lookups fail soft: any underlying error is recorded as a diagnostic and
/// surfaces as an empty result.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn lookup(&self, artist: &ArtistRef, diag: &mut DiagnosticsCollector) -> Vec<String>;
}

/// Variant 1: direct catalog lookup by stable id.
pub struct CatalogIdSource {
    catalog: Arc<dyn Catalog>,
    normalizer: Arc<TagNormalizer>,
}

impl CatalogIdSource {
    pub fn new(catalog: Arc<dyn Catalog>, normalizer: Arc<TagNormalizer>) -> Self {
        Self {
            catalog,
            normalizer,
        }
    }
}

#[async_trait]
impl EvidenceSource for CatalogIdSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CatalogLookup
    }

    async fn lookup(&self, artist: &ArtistRef, diag: &mut DiagnosticsCollector) -> Vec<String> {
        let Some(id) = &artist.id else {
            return Vec::new();
        };

        match self.catalog.lookup_by_id(id).await {
            Ok(Some(found)) => self.normalizer.canonical_tags(found.genres),
            Ok(None) => {
                diag.record(
                    (&artist.id, &artist.name),
                    self.kind(),
                    DiagnosticCategory::NotFound,
                    format!("no catalog entry for id {}", id),
                );
                Vec::new()
            }
            Err(error) => {
                diag.record(
                    (&artist.id, &artist.name),
                    self.kind(),
                    DiagnosticCategory::ProviderError,
                    error.to_string(),
                );
                Vec::new()
            }
        }
    }
}

/// Variant 2: catalog search by display name, best match wins.
pub struct CatalogSearchSource {
    catalog: Arc<dyn Catalog>,
    normalizer: Arc<TagNormalizer>,
}

impl CatalogSearchSource {
    pub fn new(catalog: Arc<dyn Catalog>, normalizer: Arc<TagNormalizer>) -> Self {
        Self {
            catalog,
            normalizer,
        }
    }
}

#[async_trait]
impl EvidenceSource for CatalogSearchSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CatalogSearch
    }

    async fn lookup(&self, artist: &ArtistRef, diag: &mut DiagnosticsCollector) -> Vec<String> {
        let name = artist.name.trim();
        if name.is_empty() {
            return Vec::new();
        }

        match self.catalog.search_by_name(name).await {
            Ok(Some(found)) => self.normalizer.canonical_tags(found.genres),
            Ok(None) => {
                diag.record(
                    (&artist.id, &artist.name),
                    self.kind(),
                    DiagnosticCategory::NotFound,
                    "no search match",
                );
                Vec::new()
            }
            Err(error) => {
                diag.record(
                    (&artist.id, &artist.name),
                    self.kind(),
                    DiagnosticCategory::ProviderError,
                    error.to_string(),
                );
                Vec::new()
            }
        }
    }
}

/// Variant 3: curated alias table, exact display-name match.
pub struct AliasSource {
    table: Arc<AliasTable>,
    normalizer: Arc<TagNormalizer>,
}

impl AliasSource {
    pub fn new(table: Arc<AliasTable>, normalizer: Arc<TagNormalizer>) -> Self {
        Self { table, normalizer }
    }
}

#[async_trait]
impl EvidenceSource for AliasSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Alias
    }

    async fn lookup(&self, artist: &ArtistRef, _diag: &mut DiagnosticsCollector) -> Vec<String> {
        match self.table.lookup(&artist.name) {
            Some(tags) => self.normalizer.canonical_tags(tags),
            None => Vec::new(),
        }
    }
}

/// Variant 4: display-name pattern heuristics.
pub struct HeuristicSource {
    heuristics: Arc<NameHeuristics>,
}

impl HeuristicSource {
    pub fn new(heuristics: Arc<NameHeuristics>) -> Self {
        Self { heuristics }
    }
}

#[async_trait]
impl EvidenceSource for HeuristicSource {
    fn kind(&self) -> SourceKind {
        SourceKind::NameHeuristic
    }

    async fn lookup(&self, artist: &ArtistRef, _diag: &mut DiagnosticsCollector) -> Vec<String> {
        self.heuristics.tags_for_name(&artist.name)
    }
}

/// Variant 5: related-artist inference.
///
/// Pools the tags of up to [`RELATED_POOL_LIMIT`] related artists and keeps
/// the [`RELATED_TOP_TAGS`] most frequent, ordered by count descending then
/// tag ascending so the result is reproducible.
pub struct RelatedSource {
    catalog: Arc<dyn Catalog>,
    normalizer: Arc<TagNormalizer>,
}

impl RelatedSource {
    pub fn new(catalog: Arc<dyn Catalog>, normalizer: Arc<TagNormalizer>) -> Self {
        Self {
            catalog,
            normalizer,
        }
    }
}

#[async_trait]
impl EvidenceSource for RelatedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Related
    }

    async fn lookup(&self, artist: &ArtistRef, diag: &mut DiagnosticsCollector) -> Vec<String> {
        let Some(id) = &artist.id else {
            return Vec::new();
        };

        let related = match self.catalog.related_of(id).await {
            Ok(related) => related,
            Err(error) => {
                diag.record(
                    (&artist.id, &artist.name),
                    self.kind(),
                    DiagnosticCategory::ProviderError,
                    error.to_string(),
                );
                return Vec::new();
            }
        };

        if related.is_empty() {
            diag.record(
                (&artist.id, &artist.name),
                self.kind(),
                DiagnosticCategory::NotFound,
                "no related artists",
            );
            return Vec::new();
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for rel in related.iter().take(RELATED_POOL_LIMIT) {
            for genre in &rel.genres {
                let canonical = self.normalizer.normalize(genre);
                if canonical.is_empty() || self.normalizer.is_generic(&canonical) {
                    continue;
                }
                *counts.entry(canonical).or_default() += 1;
            }
        }

        let mut pooled: Vec<(String, usize)> = counts.into_iter().collect();
        pooled.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pooled.truncate(RELATED_TOP_TAGS);

        debug!(
            target: "sources",
            artist = %artist.name,
            pooled = ?pooled,
            "related inference pooled tags"
        );

        pooled.into_iter().map(|(tag, _)| tag).collect()
    }
}

/// Variant 6: external community tag service, lowest confidence.
pub struct ExternalTagSource {
    service: Arc<dyn TagService>,
    normalizer: Arc<TagNormalizer>,
}

impl ExternalTagSource {
    pub fn new(service: Arc<dyn TagService>, normalizer: Arc<TagNormalizer>) -> Self {
        Self {
            service,
            normalizer,
        }
    }
}

#[async_trait]
impl EvidenceSource for ExternalTagSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ExternalTags
    }

    async fn lookup(&self, artist: &ArtistRef, diag: &mut DiagnosticsCollector) -> Vec<String> {
        let name = artist.name.trim();
        if name.is_empty() {
            return Vec::new();
        }

        let external_id = match self.service.search_artist(name).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                diag.record(
                    (&artist.id, &artist.name),
                    self.kind(),
                    DiagnosticCategory::NotFound,
                    "no external match",
                );
                return Vec::new();
            }
            Err(error) => {
                diag.record(
                    (&artist.id, &artist.name),
                    self.kind(),
                    DiagnosticCategory::ProviderError,
                    error.to_string(),
                );
                return Vec::new();
            }
        };

        match self.service.artist_tags(external_id).await {
            Ok(tags) => self.normalizer.canonical_tags(tags),
            Err(error) => {
                diag.record(
                    (&artist.id, &artist.name),
                    self.kind(),
                    DiagnosticCategory::ProviderError,
                    error.to_string(),
                );
                Vec::new()
            }
        }
    }
}
