//! Token resolution for labelgate
//!
//! In CI the token normally arrives through the environment. For local runs
//! it can be kept in `~/.config/labelgate/secrets.toml`, which must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Explicit `--token` argument
//! 2. Environment variables (GITHUB_TOKEN, then INPUT_TOKEN)
//! 3. Secrets file (~/.config/labelgate/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Environment variables consulted for a token, in order
const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "INPUT_TOKEN"];

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub token
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path)?.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }
        }

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/labelgate/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("labelgate").join("secrets.toml"))
    }

    /// Resolve the GitHub token
    pub fn github_token(&self, explicit: Option<&str>) -> Option<String> {
        self.github_token_with(explicit, |key| std::env::var(key).ok())
    }

    /// Resolve the GitHub token using an arbitrary variable lookup
    pub fn github_token_with(
        &self,
        explicit: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        if let Some(token) = non_empty(explicit.map(String::from)) {
            debug!("Using GitHub token from command line");
            return Some(token);
        }

        for var in TOKEN_ENV_VARS {
            if let Some(token) = non_empty(lookup(var)) {
                debug!(var, "Using GitHub token from environment");
                return Some(token);
            }
        }

        if let Some(token) = non_empty(self.github.token.clone()) {
            debug!("Using GitHub token from secrets file");
            return Some(token);
        }

        None
    }
}

fn non_empty(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_secrets(token: &str) -> Secrets {
        Secrets {
            github: GitHubSecrets {
                token: Some(token.to_string()),
            },
        }
    }

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[github]
token = "ghp_xxxxxxxxxxxx"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.github.token, Some("ghp_xxxxxxxxxxxx".to_string()));
    }

    #[test]
    fn test_explicit_token_wins() {
        let secrets = file_secrets("from_file");
        let token = secrets.github_token_with(Some("  from_cli "), |_| Some("from_env".into()));
        assert_eq!(token.as_deref(), Some("from_cli"));
    }

    #[test]
    fn test_env_order() {
        let secrets = Secrets::default();
        let token = secrets.github_token_with(None, |key| match key {
            "GITHUB_TOKEN" => Some(String::new()),
            "INPUT_TOKEN" => Some("from_input".into()),
            _ => None,
        });
        assert_eq!(token.as_deref(), Some("from_input"));
    }

    #[test]
    fn test_file_fallback() {
        let secrets = file_secrets("from_file");
        assert_eq!(
            secrets.github_token_with(None, |_| None).as_deref(),
            Some("from_file")
        );
        assert!(Secrets::default().github_token_with(None, |_| None).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Secrets::load_from_file(file.path());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"  ghp_test \"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.github.token, Some("ghp_test".to_string()));
    }
}
