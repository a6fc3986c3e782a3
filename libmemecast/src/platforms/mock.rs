//! Mock platform implementation for testing
//!
//! A configurable stand-in that records every submission it receives and
//! can simulate clean successes, transient successes, and failures, so
//! orchestrator behavior can be verified without credentials or network
//! access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{ContentRecord, SubmitOutcome};

/// What the mock should do when asked to submit
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return a clean permalink
    Succeed,
    /// Return a permalink wrapped in a transport warning
    SucceedWithWarning(String),
    /// Fail with a submission error
    Fail(String),
}

/// Configuration and shared observation state for a mock platform
///
/// Clone the config before constructing the platform; the `Arc` fields let
/// the test keep eyes on call counts and captured records after the
/// platform has been boxed and moved into a job.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub name: String,
    pub auth_succeeds: bool,
    pub behavior: MockBehavior,
    pub auth_call_count: Arc<Mutex<usize>>,
    pub submit_call_count: Arc<Mutex<usize>>,
    pub submitted: Arc<Mutex<Vec<ContentRecord>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_succeeds: true,
            behavior: MockBehavior::Succeed,
            auth_call_count: Arc::new(Mutex::new(0)),
            submit_call_count: Arc::new(Mutex::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockConfig {
    pub fn submit_call_count(&self) -> usize {
        *self.submit_call_count.lock().unwrap()
    }

    pub fn submitted(&self) -> Vec<ContentRecord> {
        self.submitted.lock().unwrap().clone()
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
    authenticated: bool,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// A pre-authenticated mock that always succeeds
    pub fn success(name: &str) -> Self {
        let mut platform = Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        });
        platform.authenticated = true;
        platform
    }

    /// A pre-authenticated mock that fails every submission
    pub fn failing(name: &str, error: &str) -> Self {
        let mut platform = Self::new(MockConfig {
            name: name.to_string(),
            behavior: MockBehavior::Fail(error.to_string()),
            ..Default::default()
        });
        platform.authenticated = true;
        platform
    }

    /// A pre-authenticated mock built from a shared config
    pub fn with_config(config: MockConfig) -> Self {
        let mut platform = Self::new(config);
        platform.authenticated = true;
        platform
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn authenticate(&mut self) -> Result<()> {
        *self.config.auth_call_count.lock().unwrap() += 1;
        if self.config.auth_succeeds {
            self.authenticated = true;
            Ok(())
        } else {
            Err(PlatformError::Authentication("Mock authentication failed".to_string()).into())
        }
    }

    async fn submit(&self, record: &ContentRecord) -> Result<SubmitOutcome> {
        *self.config.submit_call_count.lock().unwrap() += 1;

        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        self.config.submitted.lock().unwrap().push(record.clone());

        let n = *self.config.submit_call_count.lock().unwrap();
        let permalink = format!(
            "https://reddit.com/r/{}/comments/{}{}",
            record.forum, self.config.name, n
        );

        match &self.config.behavior {
            MockBehavior::Succeed => Ok(SubmitOutcome::Submitted { permalink }),
            MockBehavior::SucceedWithWarning(warning) => Ok(SubmitOutcome::SubmittedWithWarning {
                permalink,
                warning: warning.clone(),
            }),
            MockBehavior::Fail(error) => {
                // The captured record stays; a failure must not look like a claim.
                Err(PlatformError::Submission(error.clone()).into())
            }
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
