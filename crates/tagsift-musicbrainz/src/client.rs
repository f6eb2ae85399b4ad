// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{MusicBrainzError, Result};
use crate::models::{ArtistSearchResponse, MbArtist};
use crate::rate_limiter::RequestPacer;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;
use uuid::Uuid;

const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";
const USER_AGENT: &str = concat!(
    "tagsift/",
    env!("CARGO_PKG_VERSION"),
    " ( https://github.com/tagsift/tagsift )"
);

/// MusicBrainz API client with cooperative request pacing.
#[derive(Debug, Clone)]
pub struct MusicBrainzClient {
    client: Client,
    base_url: String,
    pacer: RequestPacer,
}

impl MusicBrainzClient {
    /// Create a new MusicBrainz client with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder() -> MusicBrainzClientBuilder {
        MusicBrainzClientBuilder::default()
    }

    /// Search for an artist by name and return the best match.
    ///
    /// Candidates are ranked by MusicBrainz's own relevance score; equally
    /// scored candidates keep the provider's return order, so the first wins.
    pub async fn search_best_artist(&self, name: &str) -> Result<Option<MbArtist>> {
        let mut url = Url::parse(&format!("{}/artist", self.base_url))
            .map_err(|e| MusicBrainzError::InvalidResponse(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("query", name)
            .append_pair("fmt", "json")
            .append_pair("limit", "5");

        let response: ArtistSearchResponse = self.get(url.as_str()).await?;

        let mut best: Option<MbArtist> = None;
        for candidate in response.artists {
            let candidate_score = candidate.score.unwrap_or(0);
            match &best {
                Some(current) if candidate_score <= current.score.unwrap_or(0) => {}
                _ => best = Some(candidate),
            }
        }

        Ok(best)
    }

    /// Fetch the community tag names attached to an artist.
    ///
    /// Tags are returned raw, in the provider's order; normalization and
    /// generic filtering happen at the evidence layer.
    pub async fn artist_tags(&self, mbid: Uuid) -> Result<Vec<String>> {
        let url = format!("{}/artist/{}?inc=tags&fmt=json", self.base_url, mbid);
        let artist: MbArtist = self.get(&url).await?;

        Ok(artist
            .tags
            .into_iter()
            .map(|tag| tag.name)
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// Internal method to perform paced GET requests.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.pacer.pace().await;

        trace!(target: "musicbrainz", "GET {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        debug!(target: "musicbrainz", "response status: {}", status);

        if status == 404 {
            return Err(MusicBrainzError::NotFound(url.to_string()));
        }

        if status == 503 {
            return Err(MusicBrainzError::RateLimitExceeded);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MusicBrainzError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "musicbrainz", "response body: {}", body);

        serde_json::from_str(&body).map_err(|e| {
            MusicBrainzError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }
}

/// Builder for configuring a MusicBrainz client.
#[derive(Debug)]
pub struct MusicBrainzClientBuilder {
    base_url: String,
    timeout: Duration,
    request_delay: Duration,
}

impl Default for MusicBrainzClientBuilder {
    fn default() -> Self {
        Self {
            base_url: MUSICBRAINZ_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            request_delay: Duration::from_millis(1100),
        }
    }
}

impl MusicBrainzClientBuilder {
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

    /// Set the minimum delay between successive requests.
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Build the MusicBrainz client.
    pub fn build(self) -> Result<MusicBrainzClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(MusicBrainzClient {
            client,
            base_url: self.base_url,
            pacer: RequestPacer::new(self.request_delay),
        })
    }
}
