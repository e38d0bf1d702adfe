//! Error types for labelgate

use thiserror::Error;

/// Result type alias for labelgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for labelgate operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid file glob
    #[error("Invalid file glob {glob:?}: {source}")]
    Glob {
        glob: String,
        #[source]
        source: globset::Error,
    },

    /// Failure reported by the pull request host
    #[error("Pull request host error: {0}")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an error coming from a [`PullRequestHost`](crate::PullRequestHost) implementation
    pub fn host(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Host(Box::new(err))
    }
}
