//! Check command - enforce the label policy on one pull request

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use labelgate_core::{Action, CliOverrides, Config, DismissReason, Outcome, PrChecker, Secrets};
use labelgate_github::{parse_github_url, pr_number_from_ref, GitHubClient};

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// GitHub token (falls back to GITHUB_TOKEN, INPUT_TOKEN, then the secrets file)
    #[arg(long)]
    pub token: Option<String>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: String,

    /// Pull request number (defaults to the one in GITHUB_REF)
    #[arg(long)]
    pub pr: Option<u64>,

    /// Git ref of the workflow run, e.g. refs/pull/42/merge
    #[arg(long, env = "GITHUB_REF")]
    pub github_ref: Option<String>,

    /// Comma separated labels confirming critical changes
    #[arg(long)]
    pub valid_labels: Option<String>,

    /// Comma separated globs identifying critical files
    #[arg(long)]
    pub file_globs: Option<String>,

    /// Opening of the change-request review
    #[arg(long)]
    pub required_label_message: Option<String>,

    /// Dismissal message once a valid label is present
    #[arg(long)]
    pub label_added_message: Option<String>,

    /// Dismissal message once the critical changes are gone
    #[arg(long)]
    pub changes_reverted_message: Option<String>,

    /// Login of the account posting reviews
    #[arg(long)]
    pub bot_login: Option<String>,

    /// Body text identifying the bot's reviews
    #[arg(long)]
    pub bot_marker: Option<String>,

    /// Config file (defaults to .github/labelgate.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dry run - report the action without creating or dismissing reviews
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with an error while the pull request is in violation
    #[arg(long)]
    pub fail_on_violation: bool,
}

impl CheckArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            valid_labels: self.valid_labels.clone(),
            file_globs: self.file_globs.clone(),
            required_label_message: self.required_label_message.clone(),
            label_added_message: self.label_added_message.clone(),
            changes_reverted_message: self.changes_reverted_message.clone(),
            bot_login: self.bot_login.clone(),
            bot_marker: self.bot_marker.clone(),
        }
    }

    fn pr_number(&self) -> anyhow::Result<u64> {
        if let Some(number) = self.pr {
            return Ok(number);
        }

        match &self.github_ref {
            Some(github_ref) => Ok(pr_number_from_ref(github_ref)?),
            None => bail!("No pull request given; pass --pr or set GITHUB_REF"),
        }
    }

    /// Execute the check command
    pub async fn execute(&self, verbose: bool) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(self.config.as_deref(), self.overrides())
            .context("Failed to load configuration")?;
        config.validate()?;

        let (owner, repo) = parse_github_url(&self.repo)?;
        let pr_number = self.pr_number()?;

        if verbose {
            tracing::info!(
                repo = %self.repo,
                pr = pr_number,
                valid_labels = ?config.policy.valid_labels,
                file_globs = ?config.policy.file_globs,
                "Configuration loaded"
            );
        }

        let secrets = Secrets::load().context("Failed to load secrets")?;
        let token = secrets.github_token(self.token.as_deref()).context(
            "GitHub token not found. Pass --token, set GITHUB_TOKEN, \
             or add a token to ~/.config/labelgate/secrets.toml",
        )?;

        let github = GitHubClient::new(token, owner, repo)?;
        let pr = github.pull_request(pr_number).await?;

        let checker = PrChecker::new(&config, &pr)?.with_dry_run(self.dry_run);
        let outcome = checker.verify_pr().await?;

        print_summary(pr_number, &config, &outcome, self.dry_run);

        if self.fail_on_violation && outcome.is_violation() {
            bail!(
                "Pull request #{} changes critical files without one of the labels {:?}",
                pr_number,
                config.policy.valid_labels
            );
        }

        Ok(())
    }
}

fn print_summary(pr_number: u64, config: &Config, outcome: &Outcome, dry_run: bool) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    println!();
    println!("Pull request #{}", pr_number);
    println!(
        "  Critical files changed: {}",
        yes_no(outcome.facts.critical_files_changed)
    );
    println!(
        "  Required label present: {}",
        yes_no(outcome.facts.required_label_present)
    );
    println!(
        "  Existing bot change requests: {}",
        outcome.facts.existing_bot_reviews
    );

    let prefix = if dry_run { "[Dry run] Would " } else { "" };
    let action = match outcome.action {
        Action::NoOp => "Nothing to do".to_string(),
        Action::CreateReview => format!(
            "{}request changes until one of {:?} is added",
            prefix, config.policy.valid_labels
        ),
        Action::Dismiss(reason) => {
            let why = match reason {
                DismissReason::LabelAdded => "label added",
                DismissReason::ChangesReverted => "changes reverted",
            };
            format!(
                "{}dismiss {} review(s) ({})",
                prefix,
                outcome.dismissed.len(),
                why
            )
        }
    };
    println!("  Action: {}", action);
}
