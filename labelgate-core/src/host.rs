//! Abstraction over the service hosting the pull request

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::review::Review;
use crate::Result;

/// A file changed by the pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Repository-relative path
    pub filename: String,
    /// Change status as reported by the host (added, modified, removed...)
    pub status: Option<String>,
}

impl ChangedFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: None,
        }
    }
}

/// Event submitted along with a new review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
    RequestChanges,
}

impl ReviewEvent {
    /// Wire name used by the GitHub REST API
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewEvent::RequestChanges => "REQUEST_CHANGES",
        }
    }
}

impl std::fmt::Display for ReviewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations the checker needs from the pull request host
///
/// Implementations are bound to a single pull request.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Names of the labels attached to the pull request
    async fn labels(&self) -> Result<Vec<String>>;

    /// Every file changed by the pull request
    async fn changed_files(&self) -> Result<Vec<ChangedFile>>;

    /// Every review submitted on the pull request
    async fn reviews(&self) -> Result<Vec<Review>>;

    /// Submit a new review
    async fn create_review(&self, body: &str, event: ReviewEvent) -> Result<()>;

    /// Dismiss a previously submitted review
    async fn dismiss_review(&self, review_id: u64, message: &str) -> Result<()>;
}
