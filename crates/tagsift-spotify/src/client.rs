// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Result, SpotifyError};
use crate::models::{
    ArtistSearchResponse, ArtistsEnvelope, CatalogArtist, RelatedArtistsResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Maximum number of artist ids accepted by the batched `/artists` endpoint.
pub const MAX_BATCH_IDS: usize = 50;

/// Spotify Web API client.
///
/// Token acquisition and refresh belong to the caller; the client only
/// attaches whatever bearer token it was built with.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl SpotifyClient {
    /// Create a new client with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder() -> SpotifyClientBuilder {
        SpotifyClientBuilder::default()
    }

    /// Look up a single artist by catalog id.
    pub async fn artist(&self, id: &str) -> Result<CatalogArtist> {
        let url = format!("{}/artists/{}", self.base_url, id);
        self.get(&url).await
    }

    /// Look up a batch of artists in one request.
    ///
    /// At most [`MAX_BATCH_IDS`] ids per call; chunking larger id sets is the
    /// caller's responsibility. Unresolvable ids are omitted from the result.
    pub async fn artists(&self, ids: &[&str]) -> Result<Vec<CatalogArtist>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_BATCH_IDS {
            return Err(SpotifyError::InvalidResponse(format!(
                "batch lookup limited to {} ids, got {}",
                MAX_BATCH_IDS,
                ids.len()
            )));
        }

        let mut url = Url::parse(&format!("{}/artists", self.base_url))
            .map_err(|e| SpotifyError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut().append_pair("ids", &ids.join(","));

        let envelope: ArtistsEnvelope = self.get(url.as_str()).await?;
        Ok(envelope.artists.into_iter().flatten().collect())
    }

    /// Search the catalog for an artist by name and return the best match.
    ///
    /// Candidates are ranked by popularity; ties keep the provider's return
    /// order, so the first of equally popular candidates wins.
    pub async fn search_artist(&self, name: &str) -> Result<Option<CatalogArtist>> {
        let mut url = Url::parse(&format!("{}/search", self.base_url))
            .map_err(|e| SpotifyError::InvalidResponse(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("q", &format!("artist:{}", name))
            .append_pair("type", "artist")
            .append_pair("limit", "5");

        let response: ArtistSearchResponse = self.get(url.as_str()).await?;

        let mut best: Option<CatalogArtist> = None;
        for candidate in response.artists.items {
            let candidate_pop = candidate.popularity.unwrap_or(0);
            match &best {
                Some(current) if candidate_pop <= current.popularity.unwrap_or(0) => {}
                _ => best = Some(candidate),
            }
        }

        Ok(best)
    }

    /// Fetch artists related to the given artist id.
    pub async fn related_artists(&self, id: &str) -> Result<Vec<CatalogArtist>> {
        let url = format!("{}/artists/{}/related-artists", self.base_url, id);
        let response: RelatedArtistsResponse = self.get(&url).await?;
        Ok(response.artists)
    }

    /// Internal method to perform GET requests with auth and status mapping.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        trace!(target: "spotify", "GET {}", url);

        let mut request = self.client.get(url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(target: "spotify", "response status: {}", status);

        if status == 404 {
            return Err(SpotifyError::NotFound(url.to_string()));
        }

        if status == 429 {
            return Err(SpotifyError::RateLimitExceeded);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SpotifyError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "spotify", "response body: {}", body);

        serde_json::from_str(&body)
            .map_err(|e| SpotifyError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

/// Builder for configuring a Spotify client.
#[derive(Debug)]
pub struct SpotifyClientBuilder {
    base_url: String,
    timeout: Duration,
    bearer_token: Option<String>,
}

impl Default for SpotifyClientBuilder {
    fn default() -> Self {
        Self {
            base_url: SPOTIFY_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            bearer_token: None,
        }
    }
}

impl SpotifyClientBuilder {
    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bearer token attached to every request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Build the Spotify client.
    pub fn build(self) -> Result<SpotifyClient> {
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(SpotifyClient {
            client,
            base_url: self.base_url,
            bearer_token: self.bearer_token,
        })
    }
}
