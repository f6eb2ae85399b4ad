// SPDX-License-Identifier: GPL-3.0-or-later

//! Spotify Web API client for fetching artist genre metadata.
//!
//! This crate provides the primary-catalog side of evidence gathering:
//! artist lookup by id (single and batched), artist search by name, and
//! related-artist retrieval. Authentication token acquisition is out of
//! scope; callers supply a ready bearer token.

pub mod client;
#[cfg(test)]
mod client_tests;
pub mod error;
pub mod models;

pub use client::SpotifyClient;
pub use error::{Result, SpotifyError};
pub use models::CatalogArtist;
