// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects & IDs
// ============================================================================

/// Opaque catalog identifier for an artist.
///
/// Catalog ids are provider-assigned strings, not UUIDs; they are stable but
/// otherwise uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistId(pub String);

impl ArtistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// An artist's role on a track. The first credited artist is primary, all
/// others are featured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtistRole {
    Primary,
    Featured,
}

impl ArtistRole {
    /// Role derived from an artist's position in the track credit list.
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::Primary
        } else {
            Self::Featured
        }
    }
}

impl std::fmt::Display for ArtistRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Featured => write!(f, "featured"),
        }
    }
}

/// The closed set of genre buckets a track can be assigned to.
///
/// Declaration order doubles as the tie-break preference order: when two
/// buckets accumulate equal scores, the one declared earlier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    Rock,
    Country,
    HipHop,
    Classical,
    Musical,
    Electronic,
    Other,
}

impl Bucket {
    /// All buckets in tie-break preference order.
    pub const ALL: [Bucket; 7] = [
        Bucket::Rock,
        Bucket::Country,
        Bucket::HipHop,
        Bucket::Classical,
        Bucket::Musical,
        Bucket::Electronic,
        Bucket::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Country => "country",
            Self::HipHop => "hip-hop",
            Self::Classical => "classical",
            Self::Musical => "musical",
            Self::Electronic => "electronic",
            Self::Other => "other",
        }
    }

    /// Position in the tie-break preference order (lower wins ties).
    pub fn preference(&self) -> usize {
        Self::ALL.iter().position(|b| b == self).unwrap_or(Self::ALL.len())
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Entities
// ============================================================================

/// An artist as credited on a track. The id may be absent when the catalog
/// did not supply one; such artists can still be resolved by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<ArtistId>,
    pub name: String,
}

impl ArtistRef {
    pub fn new(id: Option<ArtistId>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// An artist with neither id nor name carries no usable identity and is
    /// skipped by evidence gathering.
    pub fn is_resolvable(&self) -> bool {
        self.id.is_some() || !self.name.trim().is_empty()
    }
}

/// A track to classify: identity plus its ordered artist credit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub album: String,
    pub artists: Vec<ArtistRef>,
}

impl Track {
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.first()
    }

    pub fn primary_artist_id(&self) -> Option<&ArtistId> {
        self.artists.first().and_then(|a| a.id.as_ref())
    }
}

// ============================================================================
// Classification output
// ============================================================================

/// A canonical tag with its accumulated evidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTag {
    pub tag: String,
    pub score: f32,
}

impl ScoredTag {
    pub fn new(tag: impl Into<String>, score: f32) -> Self {
        Self {
            tag: tag.into(),
            score,
        }
    }
}

/// The result of classifying one track.
///
/// `tags` is ordered by descending score, ties broken by ascending tag
/// string; the ordering is stable for identical input evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub primary_artist_id: Option<ArtistId>,
    pub tags: Vec<ScoredTag>,
    pub bucket: Bucket,
}

/// Flat per-track record handed to downstream export code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub track_id: String,
    pub track_name: String,
    pub album: String,
    pub artist_names: String,
    pub primary_artist_id: String,
    pub tags: String,
    pub bucket: Bucket,
}

impl OutputRecord {
    pub fn new(track: &Track, result: &ClassificationResult) -> Self {
        let artist_names = track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let tags = result
            .tags
            .iter()
            .map(|t| t.tag.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            track_id: track.id.to_string(),
            track_name: track.name.clone(),
            album: track.album.clone(),
            artist_names,
            primary_artist_id: result
                .primary_artist_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            tags,
            bucket: result.bucket,
        }
    }
}
