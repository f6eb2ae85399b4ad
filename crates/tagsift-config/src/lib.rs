// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Path of the flat JSON artist-tag cache file.
    pub path: String,
    /// Entries older than this are treated as absent and re-fetched.
    pub ttl_days: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: "artist_tag_cache.json".to_string(),
            ttl_days: 14,
        }
    }
}

/// Evidence weighting constants.
///
/// Role weights multiply source weights: a tag contributed for a featured
/// artist by the catalog scores `catalog * role_featured`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsConfig {
    pub role_primary: f32,
    pub role_featured: f32,
    pub catalog: f32,
    pub alias: f32,
    pub heuristic: f32,
    pub related: f32,
    pub external: f32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            role_primary: 1.0,
            role_featured: 0.5,
            catalog: 1.0,
            alias: 0.95,
            heuristic: 0.8,
            related: 0.6,
            external: 0.5,
        }
    }
}

/// Switches controlling which evidence sources participate in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceOptions {
    /// When false, only the primary artist contributes catalog evidence;
    /// fallback tiers still consider all artists.
    pub use_all_artists: bool,
    /// Enable related-artist inference as a fallback tier.
    pub infer_related: bool,
    /// Enable the MusicBrainz tag service as the last fallback tier.
    pub use_musicbrainz: bool,
    /// Minimum delay between successive MusicBrainz requests, in seconds.
    pub musicbrainz_delay_secs: f64,
}

impl Default for EvidenceOptions {
    fn default() -> Self {
        Self {
            use_all_artists: false,
            infer_related: false,
            use_musicbrainz: false,
            musicbrainz_delay_secs: 1.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    /// Override for the API base URL (used by tests against mock servers).
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicBrainzConfig {
    /// Override for the API base URL (used by tests against mock servers).
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub cache: CacheConfig,
    pub weights: WeightsConfig,
    pub evidence: EvidenceOptions,
    pub spotify: SpotifyConfig,
    pub musicbrainz: MusicBrainzConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: TAGSIFT_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("TAGSIFT_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}

/// Install the global tracing subscriber according to the telemetry config.
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_telemetry(config: &TelemetryConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = AppConfig::default();
        assert_eq!(config.cache.ttl_days, 14);
        assert_eq!(config.weights.role_primary, 1.0);
        assert_eq!(config.weights.role_featured, 0.5);
        assert!(config.weights.catalog >= config.weights.alias);
        assert!(config.weights.alias > config.weights.heuristic);
        assert!(config.weights.heuristic > config.weights.related);
        assert!(config.weights.related > config.weights.external);
        assert!(!config.evidence.use_all_artists);
        assert!(!config.evidence.use_musicbrainz);
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TAGSIFT_EVIDENCE__USE_ALL_ARTISTS", "true");
            jail.set_env("TAGSIFT_CACHE__TTL_DAYS", "7");

            let config = load(None).expect("config should load");
            assert!(config.evidence.use_all_artists);
            assert_eq!(config.cache.ttl_days, 7);
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "tagsift.toml",
                r#"
                [evidence]
                infer_related = true
                musicbrainz_delay_secs = 2.0
                "#,
            )?;

            let config = load(Some(Path::new("tagsift.toml"))).expect("config should load");
            assert!(config.evidence.infer_related);
            assert_eq!(config.evidence.musicbrainz_delay_secs, 2.0);
            Ok(())
        });
    }
}
