// SPDX-License-Identifier: GPL-3.0-or-later

//! MusicBrainz API client for fetching community artist tags.
//!
//! This crate provides the secondary tag-evidence provider: artist search
//! by name and tag retrieval by MBID, with a cooperative inter-request
//! delay to comply with MusicBrainz API guidelines.

pub mod client;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::MusicBrainzClient;
pub use error::{MusicBrainzError, Result};
pub use models::{MbArtist, MbTag};
pub use rate_limiter::RequestPacer;
