//! GitHub Actions run context

use crate::client::parse_github_url;
use crate::{Error, Result};
use tracing::debug;

/// Repository and pull request the workflow runs for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubContext {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

impl GitHubContext {
    /// Read `GITHUB_REPOSITORY` and `GITHUB_REF` from the environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the context from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).ok_or_else(|| Error::MissingEnv(key.to_string()));

        let repository = var("GITHUB_REPOSITORY")?;
        let (owner, repo) = parse_github_url(&repository)?;
        let pr_number = pr_number_from_ref(&var("GITHUB_REF")?)?;

        debug!(%owner, %repo, pr_number, "Read GitHub Actions context");

        Ok(Self {
            owner,
            repo,
            pr_number,
        })
    }
}

/// Extract the pull request number from a ref such as `refs/pull/42/merge`
pub fn pr_number_from_ref(github_ref: &str) -> Result<u64> {
    github_ref
        .strip_prefix("refs/pull/")
        .and_then(|rest| {
            rest.strip_suffix("/merge")
                .or_else(|| rest.strip_suffix("/head"))
        })
        .filter(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|number| number.parse().ok())
        .ok_or_else(|| {
            Error::Parse(format!(
                "The pull request number could not be extracted from GITHUB_REF = {}",
                github_ref
            ))
        })
}
