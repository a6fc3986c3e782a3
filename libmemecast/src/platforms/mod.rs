//! Platform abstraction and implementations
//!
//! The core never talks to a social platform directly; it goes through the
//! [`Platform`] trait, one instance per account identity. The Reddit
//! implementation lives in [`reddit`]; [`mock`] provides a configurable
//! stand-in for tests and is available outside `cfg(test)` so integration
//! tests can use it.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContentRecord, SubmitOutcome};

pub mod mock;
pub mod reddit;

/// One authenticated identity on a social platform
///
/// Implementations own the full submission mechanics: flair resolution,
/// media upload, the supplementary description comment on image posts, and
/// the classification of transport errors that occur after the submission
/// was actually created (reported as
/// [`SubmitOutcome::SubmittedWithWarning`], never as an error).
#[async_trait]
pub trait Platform: Send + Sync {
    /// Establish a session for this identity
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` on invalid credentials or a
    /// failed token exchange.
    async fn authenticate(&mut self) -> Result<()>;

    /// Submit one content record to its forum
    ///
    /// A record with an image path is submitted as an image post, and its
    /// body (when non-empty) is posted afterwards as a top-level comment; a
    /// record without an image is submitted as a self-text post with the
    /// body as text.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` only when no submission was created. A
    /// missing flair or a failed supplementary comment is logged, not
    /// escalated.
    async fn submit(&self, record: &ContentRecord) -> Result<SubmitOutcome>;

    /// Lowercase platform identifier (e.g. "reddit", "mock")
    fn name(&self) -> &str;
}
