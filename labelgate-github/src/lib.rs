//! Labelgate GitHub - GitHub integration for labelgate
//!
//! This crate implements the pull request host on top of the GitHub REST
//! API and reads the GitHub Actions run context.

mod client;
mod context;
mod error;
mod pull;

pub use client::{parse_github_url, GitHubClient};
pub use context::{pr_number_from_ref, GitHubContext};
pub use error::{Error, Result};
pub use pull::PullRequestHandle;
