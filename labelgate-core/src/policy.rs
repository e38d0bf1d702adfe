//! The label policy decision table

use serde::Serialize;

/// Observed state of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Facts {
    /// At least one changed file matches a critical glob
    pub critical_files_changed: bool,
    /// At least one PR label is in the valid label set
    pub required_label_present: bool,
    /// Number of open change-request reviews by the bot
    pub existing_bot_reviews: usize,
}

impl Facts {
    /// Critical changes without any of the required labels
    pub fn is_violation(&self) -> bool {
        self.critical_files_changed && !self.required_label_present
    }
}

/// Why the bot's review is being dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    /// A required label was added
    LabelAdded,
    /// The critical changes are gone
    ChangesReverted,
}

/// What to do with the pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NoOp,
    CreateReview,
    Dismiss(DismissReason),
}

/// Decide the single action to take for the observed facts
pub fn decide(facts: &Facts) -> Action {
    let has_review = facts.existing_bot_reviews > 0;

    match (
        facts.critical_files_changed,
        facts.required_label_present,
        has_review,
    ) {
        (false, _, false) => Action::NoOp,
        (false, _, true) => Action::Dismiss(DismissReason::ChangesReverted),
        (true, true, false) => Action::NoOp,
        (true, true, true) => Action::Dismiss(DismissReason::LabelAdded),
        (true, false, false) => Action::CreateReview,
        // Already requested changes; don't post a duplicate
        (true, false, true) => Action::NoOp,
    }
}

/// Whether any PR label is exactly one of the valid labels
pub fn has_required_label<S: AsRef<str>>(pr_labels: &[S], valid_labels: &[String]) -> bool {
    pr_labels
        .iter()
        .any(|label| valid_labels.iter().any(|valid| valid == label.as_ref()))
}
