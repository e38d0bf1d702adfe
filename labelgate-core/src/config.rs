//! Configuration management for labelgate
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (LABELGATE_*)
//! 3. Config file (.github/labelgate.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::review::{BotIdentity, DEFAULT_BOT_LOGIN};
use crate::{Error, Result};

/// Config file looked up when no explicit path is given
pub const DEFAULT_CONFIG_PATH: &str = ".github/labelgate.toml";

/// Which files are critical and which labels approve them
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Labels that confirm critical changes (any one suffices)
    pub valid_labels: Vec<String>,

    /// Globs identifying critical files
    pub file_globs: Vec<String>,
}

/// Messages used in reviews and dismissals
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Messages {
    /// Opening of the change-request review body
    pub required_label: String,

    /// Dismissal message once a required label is present
    pub label_added: String,

    /// Dismissal message once no critical files remain
    pub changes_reverted: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required_label: "There are changes to critical files in this pull request."
                .to_string(),
            label_added: "A required label was added, dismissing the change request.".to_string(),
            changes_reverted: "The critical changes were reverted, dismissing the change request."
                .to_string(),
        }
    }
}

/// Identity of the bot account posting reviews
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// Login of the account the token belongs to
    pub login: String,

    /// Body text identifying the bot's reviews (defaults to the required-label message)
    pub marker: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            login: DEFAULT_BOT_LOGIN.to_string(),
            marker: None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub policy: PolicyConfig,
    pub messages: Messages,
    pub bot: BotConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub valid_labels: Option<String>,
    pub file_globs: Option<String>,
    pub required_label_message: Option<String>,
    pub label_added_message: Option<String>,
    pub changes_reverted_message: Option<String>,
    pub bot_login: Option<String>,
    pub bot_marker: Option<String>,
}

impl Config {
    /// Load configuration from `path`, or from the default location
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let path = Self::default_config_path();
                if path.exists() {
                    Self::load_from_file(&path)
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Get the default config file path, relative to the working directory
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - LABELGATE_VALID_LABELS: comma separated labels
    /// - LABELGATE_FILE_GLOBS: comma separated globs
    /// - LABELGATE_REQUIRED_LABEL_MESSAGE
    /// - LABELGATE_LABEL_ADDED_MESSAGE
    /// - LABELGATE_CHANGES_REVERTED_MESSAGE
    /// - LABELGATE_BOT_LOGIN
    /// - LABELGATE_BOT_MARKER
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_env_lookup(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.with_cli_overrides(CliOverrides {
            valid_labels: lookup("LABELGATE_VALID_LABELS"),
            file_globs: lookup("LABELGATE_FILE_GLOBS"),
            required_label_message: lookup("LABELGATE_REQUIRED_LABEL_MESSAGE"),
            label_added_message: lookup("LABELGATE_LABEL_ADDED_MESSAGE"),
            changes_reverted_message: lookup("LABELGATE_CHANGES_REVERTED_MESSAGE"),
            bot_login: lookup("LABELGATE_BOT_LOGIN"),
            bot_marker: lookup("LABELGATE_BOT_MARKER"),
        })
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(labels) = overrides.valid_labels {
            self.policy.valid_labels = split_list(&labels);
        }

        if let Some(globs) = overrides.file_globs {
            self.policy.file_globs = split_list(&globs);
        }

        if let Some(m) = overrides.required_label_message {
            self.messages.required_label = m;
        }

        if let Some(m) = overrides.label_added_message {
            self.messages.label_added = m;
        }

        if let Some(m) = overrides.changes_reverted_message {
            self.messages.changes_reverted = m;
        }

        if let Some(login) = overrides.bot_login {
            self.bot.login = login;
        }

        if let Some(marker) = overrides.bot_marker {
            self.bot.marker = Some(marker);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(path: Option<&Path>, overrides: CliOverrides) -> Result<Self> {
        Ok(Self::load(path)?
            .with_env_overrides()
            .with_cli_overrides(overrides))
    }

    /// Check that the policy can be enforced
    pub fn validate(&self) -> Result<()> {
        if self.policy.valid_labels.is_empty() {
            return Err(Error::Config(
                "No valid labels configured; set policy.valid_labels or --valid-labels"
                    .to_string(),
            ));
        }

        if self.policy.file_globs.is_empty() {
            warn!("No file globs configured; no file will be considered critical");
        }

        Ok(())
    }

    /// How the bot recognizes its own reviews
    pub fn bot_identity(&self) -> BotIdentity {
        let marker = self
            .bot
            .marker
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.messages.required_label.trim().to_string());
        BotIdentity::new(self.bot.login.clone(), marker)
    }
}

/// Split a comma separated list, trimming entries and dropping empty ones
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.policy.valid_labels.is_empty());
        assert!(config.policy.file_globs.is_empty());
        assert_eq!(config.bot.login, "github-actions[bot]");
        assert!(config.bot.marker.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[policy]
valid_labels = ["translations-approved", "skip-translations"]
file_globs = ["**/locales/production/*.json"]

[messages]
required_label = "There are changes to production translations in this pull request."

[bot]
login = "translations-bot"
marker = "production translations"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.policy.valid_labels,
            vec!["translations-approved", "skip-translations"]
        );
        assert_eq!(config.policy.file_globs, vec!["**/locales/production/*.json"]);
        assert_eq!(config.bot.login, "translations-bot");
        // Unset messages keep their defaults
        assert_eq!(config.messages.label_added, Messages::default().label_added);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[policy]\nvalid_labels = [\"ok\"]").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.policy.valid_labels, vec!["ok"]);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/labelgate.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[policy\nvalid_labels = ").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            valid_labels: Some("a, b,,c".to_string()),
            file_globs: Some("**/main.*".to_string()),
            required_label_message: Some("Critical!".to_string()),
            ..Default::default()
        });

        assert_eq!(config.policy.valid_labels, vec!["a", "b", "c"]);
        assert_eq!(config.policy.file_globs, vec!["**/main.*"]);
        assert_eq!(config.messages.required_label, "Critical!");
    }

    #[test]
    fn test_cli_beats_env() {
        let env: HashMap<&str, &str> = [
            ("LABELGATE_VALID_LABELS", "from-env"),
            ("LABELGATE_BOT_LOGIN", "env-bot"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_env_lookup(|k| env.get(k).map(|v| v.to_string()))
            .with_cli_overrides(CliOverrides {
                valid_labels: Some("from-cli".to_string()),
                ..Default::default()
            });

        assert_eq!(config.policy.valid_labels, vec!["from-cli"]);
        assert_eq!(config.bot.login, "env-bot");
    }

    #[test]
    fn test_validate_requires_labels() {
        assert!(Config::default().validate().is_err());

        let config = Config::default().with_cli_overrides(CliOverrides {
            valid_labels: Some("ok".to_string()),
            ..Default::default()
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bot_identity_marker_defaults_to_message() {
        let config = Config::default();
        let identity = config.bot_identity();
        assert_eq!(identity.marker, config.messages.required_label);

        let config = config.with_cli_overrides(CliOverrides {
            bot_marker: Some("custom marker".to_string()),
            ..Default::default()
        });
        assert_eq!(config.bot_identity().marker, "custom marker");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" x , y "), vec!["x", "y"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ").is_empty());
    }
}
