// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

/// Artist information from the Spotify catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogArtist {
    /// Catalog artist id (opaque base-62 string).
    pub id: String,
    /// Artist display name.
    pub name: String,
    /// Raw genre tags attached to the artist. Frequently empty.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Popularity metric (0-100), used to rank search candidates.
    #[serde(default)]
    pub popularity: Option<u32>,
}

/// Envelope for the batched `/artists` endpoint.
///
/// The API returns `null` for ids it cannot resolve, preserving request
/// order; those slots are dropped during extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistsEnvelope {
    pub artists: Vec<Option<CatalogArtist>>,
}

/// Envelope for artist search results.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistSearchResponse {
    pub artists: ArtistSearchPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistSearchPage {
    #[serde(default)]
    pub items: Vec<CatalogArtist>,
}

/// Envelope for the related-artists endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedArtistsResponse {
    #[serde(default)]
    pub artists: Vec<CatalogArtist>,
}
