//! Config command - print the effective configuration

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use labelgate_core::{CliOverrides, Config};

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config file (defaults to .github/labelgate.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Execute the config command
    pub fn execute(&self) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(self.config.as_deref(), CliOverrides::default())
            .context("Failed to load configuration")?;

        let path = self
            .config
            .clone()
            .unwrap_or_else(Config::default_config_path);

        println!("Labelgate Configuration");
        println!("=======================");
        println!();
        println!("Policy:");
        println!("  valid_labels: {:?}", config.policy.valid_labels);
        println!("  file_globs: {:?}", config.policy.file_globs);
        println!();
        println!("Messages:");
        println!("  required_label: {}", config.messages.required_label);
        println!("  label_added: {}", config.messages.label_added);
        println!("  changes_reverted: {}", config.messages.changes_reverted);
        println!();
        let identity = config.bot_identity();
        println!("Bot:");
        println!("  login: {}", identity.login);
        println!("  marker: {}", identity.marker);
        println!();
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }

        if let Err(e) = config.validate() {
            println!();
            println!("Warning: {}", e);
        }

        Ok(())
    }
}
