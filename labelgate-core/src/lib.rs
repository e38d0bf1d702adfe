//! Labelgate Core - policy logic for the labelgate pull request check
//!
//! This crate decides whether a pull request that touches critical files
//! carries one of the required labels, and reconciles the single bot review
//! used to enforce that decision.

pub mod checker;
pub mod config;
pub mod error;
pub mod host;
pub mod pattern;
pub mod policy;
pub mod review;
pub mod secrets;

pub use checker::{Outcome, PrChecker};
pub use config::{BotConfig, Config, CliOverrides, Messages, PolicyConfig};
pub use error::{Error, Result};
pub use host::{ChangedFile, PullRequestHost, ReviewEvent};
pub use pattern::CriticalPatterns;
pub use policy::{decide, has_required_label, Action, DismissReason, Facts};
pub use review::{bot_reviews, BotIdentity, Review, ReviewState};
pub use secrets::Secrets;
