//! CLI command implementations

pub mod check;
pub mod config;

pub use check::CheckArgs;
pub use config::ConfigArgs;
