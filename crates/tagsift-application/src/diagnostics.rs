// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-run diagnostics.
//!
//! Provider failures are converted to empty evidence, never raised; what
//! actually went wrong is recorded here instead. The collector is an
//! explicit object owned by the scorer and passed into each source lookup,
//! so nothing in the pipeline carries hidden mutable state.

use crate::sources::SourceKind;
use tagsift_domain::ArtistId;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// The provider answered but had nothing for this artist.
    NotFound,
    /// The provider call itself failed (network, malformed response, ...).
    ProviderError,
}

impl std::fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::ProviderError => write!(f, "other error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub artist_id: Option<ArtistId>,
    pub artist_name: String,
    pub source: SourceKind,
    pub category: DiagnosticCategory,
    pub message: String,
}

/// Accumulates diagnostics for one run.
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    entries: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        artist: (&Option<ArtistId>, &str),
        source: SourceKind,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) {
        let message = message.into();
        debug!(
            target: "diagnostics",
            artist = %artist.1,
            source = %source,
            category = %category,
            message = %message,
            "recorded diagnostic"
        );
        self.entries.push(Diagnostic {
            artist_id: artist.0.clone(),
            artist_name: artist.1.to_string(),
            source,
            category,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts grouped by category, for end-of-run reporting.
    pub fn summary(&self) -> DiagnosticsSummary {
        let mut summary = DiagnosticsSummary::default();
        for entry in &self.entries {
            match entry.category {
                DiagnosticCategory::NotFound => summary.not_found += 1,
                DiagnosticCategory::ProviderError => summary.errors += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsSummary {
    pub not_found: usize,
    pub errors: usize,
}

impl std::fmt::Display for DiagnosticsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "not found: {}, other errors: {}",
            self.not_found, self.errors
        )
    }
}
