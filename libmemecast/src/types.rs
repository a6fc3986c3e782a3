//! Core types for Memecast

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What kind of content an account posts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Image posts drawn from a per-forum local folder
    Meme,
    /// Self-text posts with the description as body
    Text,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Meme => write!(f, "meme"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// A fully resolved, submit-ready unit of content
///
/// Built fresh for every submission attempt and never persisted. The image
/// file it references stays on disk until the submission is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    /// Target forum (subreddit) name
    pub forum: String,
    /// Final title string, placeholders resolved
    pub title: String,
    /// Final description string, placeholders resolved
    pub body: String,
    /// Local image file to submit; `None` for self-text posts
    pub image: Option<PathBuf>,
    /// Human-readable flair label to resolve at submission time
    pub flair_text: Option<String>,
}

/// Outcome of a successful submission
///
/// The platform quirk of reporting a transport failure for a submission
/// that was in fact created server-side is an explicit variant here, so
/// callers never have to match on error message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Clean success
    Submitted { permalink: String },
    /// The submission exists, but something non-fatal went wrong on the way
    SubmittedWithWarning { permalink: String, warning: String },
}

impl SubmitOutcome {
    /// The permalink of the created submission
    pub fn permalink(&self) -> &str {
        match self {
            Self::Submitted { permalink } => permalink,
            Self::SubmittedWithWarning { permalink, .. } => permalink,
        }
    }
}

/// One successful (or debug dry-run) submission in a run
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// 1-based position within the run
    pub sequence: usize,
    /// Wall-clock time the slot was used
    pub posted_at: DateTime<Local>,
    /// Account that posted
    pub account: String,
    /// Forum posted to
    pub forum: String,
    /// Permalink of the created submission; `None` for debug dry-runs
    pub permalink: Option<String>,
}

/// Ledger of all submissions made during a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostLedger {
    entries: Vec<LedgerEntry>,
}

impl PostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, assigning the next sequence number
    pub fn record(
        &mut self,
        account: &str,
        forum: &str,
        permalink: Option<String>,
    ) -> &LedgerEntry {
        let entry = LedgerEntry {
            sequence: self.entries.len() + 1,
            posted_at: Local::now(),
            account: account.to_string(),
            forum: forum.to_string(),
            permalink,
        };
        self.entries.push(entry);
        self.entries.last().unwrap()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of entries that correspond to real submissions
    pub fn submitted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.permalink.is_some()).count()
    }
}

impl std::fmt::Display for PostLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            write!(
                f,
                "Post {}: {} ({} -> r/{})",
                entry.sequence,
                entry.posted_at.format("%H:%M:%S"),
                entry.account,
                entry.forum
            )?;
            match &entry.permalink {
                Some(url) => writeln!(f, " {}", url)?,
                None => writeln!(f, " [dry run]")?,
            }
        }
        writeln!(f, "Total posts: {}", self.submitted_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_deserializes_lowercase() {
        let kind: ContentKind = serde_json::from_str(r#""meme""#).unwrap();
        assert_eq!(kind, ContentKind::Meme);
        let kind: ContentKind = serde_json::from_str(r#""text""#).unwrap();
        assert_eq!(kind, ContentKind::Text);
    }

    #[test]
    fn test_content_kind_rejects_unknown() {
        let result: std::result::Result<ContentKind, _> = serde_json::from_str(r#""video""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_submit_outcome_permalink() {
        let ok = SubmitOutcome::Submitted {
            permalink: "https://reddit.com/r/memes/comments/abc".to_string(),
        };
        assert_eq!(ok.permalink(), "https://reddit.com/r/memes/comments/abc");

        let warned = SubmitOutcome::SubmittedWithWarning {
            permalink: "https://reddit.com/r/memes/comments/def".to_string(),
            warning: "transport error after submission".to_string(),
        };
        assert_eq!(warned.permalink(), "https://reddit.com/r/memes/comments/def");
    }

    #[test]
    fn test_ledger_sequence_numbers() {
        let mut ledger = PostLedger::new();
        ledger.record("alice", "memes", Some("https://x/1".to_string()));
        ledger.record("bob", "funny", Some("https://x/2".to_string()));

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].sequence, 1);
        assert_eq!(ledger.entries()[1].sequence, 2);
        assert_eq!(ledger.entries()[1].account, "bob");
    }

    #[test]
    fn test_ledger_submitted_count_excludes_dry_runs() {
        let mut ledger = PostLedger::new();
        ledger.record("alice", "memes", Some("https://x/1".to_string()));
        ledger.record("alice", "funny", None);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.submitted_count(), 1);
    }

    #[test]
    fn test_ledger_display_includes_totals() {
        let mut ledger = PostLedger::new();
        ledger.record("alice", "memes", Some("https://x/1".to_string()));

        let rendered = format!("{}", ledger);
        assert!(rendered.contains("Post 1:"));
        assert!(rendered.contains("r/memes"));
        assert!(rendered.contains("Total posts: 1"));
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = PostLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.submitted_count(), 0);
    }
}
