//! Reconciles a pull request against the label policy

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::host::{PullRequestHost, ReviewEvent};
use crate::pattern::CriticalPatterns;
use crate::policy::{decide, has_required_label, Action, DismissReason, Facts};
use crate::review::{bot_reviews, BotIdentity, Review};
use crate::Result;

/// Result of checking one pull request
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// What was observed
    pub facts: Facts,
    /// What the policy decided
    pub action: Action,
    /// Whether the action was performed (false for no-ops and dry runs)
    pub applied: bool,
    /// IDs of the reviews that were (or would have been) dismissed
    pub dismissed: Vec<u64>,
}

impl Outcome {
    pub fn is_violation(&self) -> bool {
        self.facts.is_violation()
    }
}

/// Checks one pull request through a [`PullRequestHost`]
pub struct PrChecker<'a, H: PullRequestHost> {
    config: &'a Config,
    patterns: CriticalPatterns,
    identity: BotIdentity,
    host: &'a H,
    dry_run: bool,
}

impl<'a, H: PullRequestHost> PrChecker<'a, H> {
    /// Create a checker, compiling the configured globs
    pub fn new(config: &'a Config, host: &'a H) -> Result<Self> {
        Ok(Self {
            config,
            patterns: CriticalPatterns::new(&config.policy.file_globs)?,
            identity: config.bot_identity(),
            host,
            dry_run: false,
        })
    }

    /// Only log the decided action instead of performing it
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether the pull request has one of the valid labels
    pub async fn pr_has_required_label(&self) -> Result<bool> {
        let labels = self.host.labels().await?;
        let present = has_required_label(&labels, &self.config.policy.valid_labels);
        debug!(?labels, present, "Checked pull request labels");
        Ok(present)
    }

    /// Whether any changed file matches a critical glob
    pub async fn pr_has_changed_critical_files(&self) -> Result<bool> {
        let files = self.host.changed_files().await?;
        match self.patterns.first_match(&files) {
            Some(file) => {
                info!(file = %file.filename, "Critical file changed");
                Ok(true)
            }
            None => {
                debug!(count = files.len(), "No critical files changed");
                Ok(false)
            }
        }
    }

    /// The bot's open change-request reviews
    pub async fn bots_pr_reviews(&self) -> Result<Vec<Review>> {
        let reviews = self.host.reviews().await?;
        Ok(bot_reviews(&self.identity, &reviews)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Body of the change-request review
    pub fn request_changes_body(&self) -> String {
        format!(
            "{} Please add one of the following labels: `{}` to confirm these changes.",
            self.config.messages.required_label.trim_end(),
            self.config.policy.valid_labels.join(", ")
        )
    }

    fn dismiss_message(&self, reason: DismissReason) -> &str {
        match reason {
            DismissReason::LabelAdded => &self.config.messages.label_added,
            DismissReason::ChangesReverted => &self.config.messages.changes_reverted,
        }
    }

    /// Check the pull request and create or dismiss the bot review as needed
    pub async fn verify_pr(&self) -> Result<Outcome> {
        let critical_files_changed = self.pr_has_changed_critical_files().await?;
        let required_label_present = self.pr_has_required_label().await?;
        let bot_reviews = self.bots_pr_reviews().await?;

        let facts = Facts {
            critical_files_changed,
            required_label_present,
            existing_bot_reviews: bot_reviews.len(),
        };
        let action = decide(&facts);

        info!(
            critical_files_changed,
            required_label_present,
            existing_bot_reviews = bot_reviews.len(),
            ?action,
            dry_run = self.dry_run,
            "Evaluated label policy"
        );

        if facts.is_violation() {
            warn!(
                valid_labels = ?self.config.policy.valid_labels,
                "Pull request contains critical changes without a valid label"
            );
        }

        let mut outcome = Outcome {
            facts,
            action,
            applied: false,
            dismissed: Vec::new(),
        };

        match action {
            Action::NoOp => {}
            Action::CreateReview => {
                let body = self.request_changes_body();
                if self.dry_run {
                    info!(%body, "[DRY RUN] Would request changes");
                } else {
                    self.host
                        .create_review(&body, ReviewEvent::RequestChanges)
                        .await?;
                    info!("Requested changes");
                    outcome.applied = true;
                }
            }
            Action::Dismiss(reason) => {
                let message = self.dismiss_message(reason);
                for review in &bot_reviews {
                    if self.dry_run {
                        info!(review_id = review.id, ?reason, "[DRY RUN] Would dismiss review");
                    } else {
                        self.host.dismiss_review(review.id, message).await?;
                        info!(review_id = review.id, ?reason, "Dismissed change request");
                    }
                    outcome.dismissed.push(review.id);
                }
                outcome.applied = !self.dry_run;
            }
        }

        Ok(outcome)
    }
}
