//! Pull request reviews and identification of the bot's own reviews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default login of the GitHub Actions automation account
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

/// Review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other,
}

/// A pull request review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Review ID
    pub id: u64,
    /// Author login
    pub author: String,
    /// Review body/summary
    pub body: Option<String>,
    /// Review state
    pub state: ReviewState,
    /// When the review was submitted
    pub submitted_at: Option<DateTime<Utc>>,
}

/// How the bot recognizes reviews it submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// Login of the automation account
    pub login: String,
    /// Text contained in every review body the bot writes
    pub marker: String,
}

impl BotIdentity {
    pub fn new(login: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            marker: marker.into(),
        }
    }

    /// Whether the review is an open change request submitted by the bot
    pub fn is_bot_review(&self, review: &Review) -> bool {
        if review.state != ReviewState::ChangesRequested {
            return false;
        }

        if review.author == self.login {
            return true;
        }

        // An empty marker would match every body
        !self.marker.is_empty()
            && review
                .body
                .as_deref()
                .is_some_and(|body| body.contains(&self.marker))
    }
}

/// Filter reviews down to the bot's open change requests
pub fn bot_reviews<'a>(identity: &BotIdentity, reviews: &'a [Review]) -> Vec<&'a Review> {
    reviews.iter().filter(|r| identity.is_bot_review(r)).collect()
}
