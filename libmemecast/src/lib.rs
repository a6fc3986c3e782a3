//! Memecast - scheduled content posting for Reddit accounts
//!
//! This library provides the core functionality for posting image or text
//! content to multiple Reddit accounts and subreddits on a timed schedule:
//! content selection from local folders, template substitution, global
//! inter-post delay enforcement, and a run orchestrator that records a
//! ledger of what was posted when.

pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod platforms;
pub mod scheduler;
pub mod template;
pub mod types;

// Re-export commonly used types
pub use config::{Account, Config, ForumTarget, GlobalSettings, Profile};
pub use content::ContentSelector;
pub use error::{MemecastError, Result};
pub use orchestrator::{AccountJob, Runner};
pub use scheduler::PostScheduler;
pub use types::{ContentKind, ContentRecord, LedgerEntry, PostLedger, SubmitOutcome};
