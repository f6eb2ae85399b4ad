// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Artist information from MusicBrainz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MbArtist {
    /// MusicBrainz artist ID (MBID).
    pub id: Uuid,
    /// Artist name.
    pub name: String,
    /// Search score (only present in search results, 0-100).
    #[serde(default)]
    pub score: Option<u32>,
    /// Community tags (only present on lookups with `inc=tags`).
    #[serde(default)]
    pub tags: Vec<MbTag>,
}

/// A community tag with its vote count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MbTag {
    pub name: String,
    #[serde(default)]
    pub count: Option<i64>,
}

/// Artist search response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistSearchResponse {
    #[serde(default)]
    pub artists: Vec<MbArtist>,
}
