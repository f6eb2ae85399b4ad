// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use tokio::time::{sleep, Duration, Instant};

/// Cooperative pacing for MusicBrainz API calls.
///
/// MusicBrainz asks non-commercial clients for at most one request per
/// second. The pacer enforces a caller-supplied minimum delay between
/// successive requests; it is a politeness contract, not admission control.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Arc<tokio::sync::Mutex<Option<Instant>>>,
}

impl RequestPacer {
    /// Create a pacer with the given minimum interval between requests.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Create a pacer from a fractional-seconds delay, as supplied by
    /// configuration (e.g. `1.1`).
    pub fn from_secs_f64(delay_secs: f64) -> Self {
        Self::new(Duration::from_secs_f64(delay_secs.max(0.0)))
    }

    /// Wait until the next request is allowed, then claim the slot.
    pub async fn pace(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_instant) = *last {
            let elapsed = last_instant.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::trace!(
                    target: "musicbrainz",
                    "pacing: waiting {:?}",
                    wait_time
                );
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}
