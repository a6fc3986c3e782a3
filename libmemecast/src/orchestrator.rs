//! Run orchestration
//!
//! Walks accounts and their forum targets in declaration order, gating each
//! attempt through the shared scheduler, pulling a content record from the
//! selector, submitting through the account's platform client, and keeping
//! a ledger of what went out. One failed target never aborts the run.

use tracing::{info, warn};

use crate::config::{Account, GlobalSettings};
use crate::content::ContentSelector;
use crate::platforms::Platform;
use crate::scheduler::PostScheduler;
use crate::types::{PostLedger, SubmitOutcome};

/// One account paired with its authenticated platform client
pub struct AccountJob {
    pub account: Account,
    pub platform: Box<dyn Platform>,
}

/// Executes one full posting pass over all accounts
pub struct Runner {
    settings: GlobalSettings,
    selector: ContentSelector,
    scheduler: PostScheduler,
}

impl Runner {
    pub fn new(settings: GlobalSettings) -> Self {
        let selector = ContentSelector::new(settings.media_root.clone());
        let scheduler = PostScheduler::new(settings.delay_minutes, settings.debug_mode);
        Self {
            settings,
            selector,
            scheduler,
        }
    }

    /// Run the posting pass and return the ledger
    ///
    /// With posting disabled this returns an empty ledger without side
    /// effects. A slot gated for a target that then turns out to have no
    /// content stays spent; that throttling behavior is deliberate.
    pub async fn run(&mut self, jobs: &[AccountJob]) -> PostLedger {
        let mut ledger = PostLedger::new();

        if !self.settings.posting_enabled {
            info!("Posting is disabled; returning an empty ledger");
            return ledger;
        }

        for job in jobs {
            let username = &job.account.username;
            for target in &job.account.subreddits {
                self.scheduler.gate().await;
                info!("Processing u/{} -> r/{}", username, target.name);

                let record = match self.selector.prepare(&job.account, target) {
                    Ok(Some(record)) => record,
                    Ok(None) => {
                        info!("No content for u/{} -> r/{}; skipping", username, target.name);
                        continue;
                    }
                    Err(e) => {
                        warn!(
                            "Could not prepare content for u/{} -> r/{}: {}",
                            username, target.name, e
                        );
                        continue;
                    }
                };

                if self.settings.debug_mode {
                    info!(
                        "[debug] Would post '{}' to r/{} as u/{}{}",
                        record.title,
                        target.name,
                        username,
                        record
                            .image
                            .as_deref()
                            .map(|p| format!(" with image {}", p.display()))
                            .unwrap_or_default()
                    );
                    ledger.record(username, &target.name, None);
                    continue;
                }

                match job.platform.submit(&record).await {
                    Ok(outcome) => {
                        if let SubmitOutcome::SubmittedWithWarning { warning, .. } = &outcome {
                            warn!(
                                "Submission to r/{} succeeded with a warning: {}",
                                target.name, warning
                            );
                        }
                        info!(
                            "Posted to r/{} as u/{}: {}",
                            target.name,
                            username,
                            outcome.permalink()
                        );
                        if let Some(image) = &record.image {
                            // Consume the file only once the post is confirmed.
                            if let Err(e) = std::fs::remove_file(image) {
                                warn!("Could not delete {}: {}", image.display(), e);
                            }
                        }
                        ledger.record(username, &target.name, Some(outcome.permalink().to_string()));
                    }
                    Err(e) => {
                        // Image stays on disk for the next run.
                        warn!(
                            "Error posting as u/{} to r/{}: {}",
                            username, target.name, e
                        );
                    }
                }
            }
        }

        info!("Run complete: {} post(s) submitted", ledger.submitted_count());
        ledger
    }
}
