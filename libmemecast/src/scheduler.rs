//! Inter-post delay enforcement
//!
//! One scheduler instance gates the whole run: every account on every forum
//! shares the same clock, so submissions from different identities are never
//! spaced closer than the configured delay. Correlated bursts across
//! accounts are exactly what platform abuse heuristics key on.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::info;

/// How often the countdown logs progress while waiting
const COUNTDOWN_TICK: Duration = Duration::from_secs(60);

/// Gates submissions to at most one per delay window
///
/// Purely time-driven: it knows nothing about accounts, forums, or content.
/// The timestamp is recorded when a slot is granted, whether or not the
/// caller ends up submitting anything in it.
#[derive(Debug)]
pub struct PostScheduler {
    delay: Duration,
    last_post: Option<Instant>,
}

impl PostScheduler {
    /// Create a scheduler with the given inter-post delay
    ///
    /// Debug mode forces the delay to zero so repeated test runs do not
    /// incur real wait time.
    pub fn new(delay_minutes: u64, debug_mode: bool) -> Self {
        let delay = if debug_mode {
            Duration::ZERO
        } else {
            Duration::from_secs(delay_minutes * 60)
        };
        Self {
            delay,
            last_post: None,
        }
    }

    /// The effective delay between slots
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Block until the next submission slot is due, then claim it
    ///
    /// The first call in a run returns immediately. Later calls sleep until
    /// `last + delay`, logging a human-readable countdown, and record "now"
    /// as the last post time regardless of how long the wait was.
    pub async fn gate(&mut self) {
        if let Some(last) = self.last_post {
            let due = last + self.delay;
            loop {
                let now = Instant::now();
                if now >= due {
                    break;
                }
                let remaining = due - now;
                info!(
                    "Waiting {} before the next post",
                    humantime::format_duration(Duration::from_secs(remaining.as_secs().max(1)))
                );
                sleep(remaining.min(COUNTDOWN_TICK)).await;
            }
        }
        self.last_post = Some(Instant::now());
    }
}
