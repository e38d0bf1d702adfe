//! Pull request host backed by the GitHub REST API

use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labelgate_core::{ChangedFile, PullRequestHost, Review, ReviewEvent, ReviewState};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{Error, GitHubClient, Result};

const PER_PAGE: usize = 100;

/// A page shorter than `PER_PAGE` is the last one
fn has_next_page(fetched: usize) -> bool {
    fetched >= PER_PAGE
}

/// Request pages starting at 1 until a short (possibly empty) page arrives
async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut all = Vec::new();
    let mut page = 1u32;

    loop {
        let items = fetch(page).await?;
        let fetched = items.len();
        all.extend(items);

        if !has_next_page(fetched) {
            break;
        }
        page += 1;
    }

    Ok(all)
}

/// Entry of `GET /pulls/{n}/files`
#[derive(Debug, Deserialize)]
struct FileEntry {
    filename: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    login: String,
}

/// Entry of `GET /pulls/{n}/reviews`
#[derive(Debug, Deserialize)]
struct ReviewEntry {
    id: u64,
    #[serde(default)]
    user: Option<UserEntry>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    state: String,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

fn parse_state(state: &str) -> ReviewState {
    match state {
        "APPROVED" => ReviewState::Approved,
        "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
        "COMMENTED" => ReviewState::Commented,
        "DISMISSED" => ReviewState::Dismissed,
        "PENDING" => ReviewState::Pending,
        _ => ReviewState::Other,
    }
}

impl From<ReviewEntry> for Review {
    fn from(r: ReviewEntry) -> Self {
        Review {
            id: r.id,
            author: r.user.map(|u| u.login).unwrap_or_default(),
            body: r.body,
            state: parse_state(&r.state),
            submitted_at: r.submitted_at,
        }
    }
}

/// A single pull request in a GitHub repository
#[derive(Debug, Clone)]
pub struct PullRequestHandle {
    github: GitHubClient,
    number: u64,
}

impl PullRequestHandle {
    pub(crate) fn new(github: GitHubClient, number: u64) -> Self {
        Self { github, number }
    }

    fn route(&self, suffix: &str) -> String {
        format!(
            "/repos/{}/{}/pulls/{}/{}",
            self.github.owner(),
            self.github.repo(),
            self.number,
            suffix
        )
    }

    /// Fetch every page of a list endpoint
    async fn list_all<T: DeserializeOwned + Send>(&self, route: &str) -> Result<Vec<T>> {
        let client = self.github.client();
        let all = collect_pages(|page| async move {
            let params = [("per_page", PER_PAGE as u32), ("page", page)];
            client
                .get::<Vec<T>, _, _>(route, Some(&params))
                .await
                .map_err(Error::Api)
        })
        .await?;

        debug!(route, count = all.len(), "Fetched all pages");

        Ok(all)
    }

    async fn fetch_labels(&self) -> Result<Vec<String>> {
        let client = self.github.client();
        let first = client
            .issues(self.github.owner(), self.github.repo())
            .list_labels_for_issue(self.number)
            .per_page(PER_PAGE as u8)
            .send()
            .await
            .map_err(Error::Api)?;
        let labels = client.all_pages(first).await.map_err(Error::Api)?;

        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn fetch_files(&self) -> Result<Vec<ChangedFile>> {
        let entries: Vec<FileEntry> = self.list_all(&self.route("files")).await?;
        Ok(entries
            .into_iter()
            .map(|f| ChangedFile {
                filename: f.filename,
                status: f.status,
            })
            .collect())
    }

    async fn fetch_reviews(&self) -> Result<Vec<Review>> {
        let entries: Vec<ReviewEntry> = self.list_all(&self.route("reviews")).await?;
        Ok(entries.into_iter().map(Review::from).collect())
    }

    async fn post_review(&self, body: &str, event: ReviewEvent) -> Result<()> {
        let _: serde_json::Value = self
            .github
            .client()
            .post(
                self.route("reviews"),
                Some(&json!({ "body": body, "event": event.as_str() })),
            )
            .await
            .map_err(Error::Api)?;
        Ok(())
    }

    async fn put_dismissal(&self, review_id: u64, message: &str) -> Result<()> {
        let _: serde_json::Value = self
            .github
            .client()
            .put(
                self.route(&format!("reviews/{}/dismissals", review_id)),
                Some(&json!({ "message": message, "event": "DISMISS" })),
            )
            .await
            .map_err(Error::Api)?;
        Ok(())
    }
}

#[async_trait]
impl PullRequestHost for PullRequestHandle {
    async fn labels(&self) -> labelgate_core::Result<Vec<String>> {
        Ok(self.fetch_labels().await?)
    }

    async fn changed_files(&self) -> labelgate_core::Result<Vec<ChangedFile>> {
        Ok(self.fetch_files().await?)
    }

    async fn reviews(&self) -> labelgate_core::Result<Vec<Review>> {
        Ok(self.fetch_reviews().await?)
    }

    async fn create_review(&self, body: &str, event: ReviewEvent) -> labelgate_core::Result<()> {
        debug!(number = self.number, %event, "Creating review");
        Ok(self.post_review(body, event).await?)
    }

    async fn dismiss_review(&self, review_id: u64, message: &str) -> labelgate_core::Result<()> {
        debug!(number = self.number, review_id, "Dismissing review");
        Ok(self.put_dismissal(review_id, message).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    /// Serves `pages` in order and records the page numbers requested
    async fn serve(pages: Vec<Vec<u32>>) -> (Vec<u32>, Vec<u32>) {
        let requested = Mutex::new(Vec::new());
        let items = collect_pages(|n| {
            requested.lock().unwrap().push(n);
            let items = pages.get(n as usize - 1).cloned().unwrap_or_default();
            std::future::ready(Ok(items))
        })
        .await
        .unwrap();
        (items, requested.into_inner().unwrap())
    }

    fn page(start: u32, len: usize) -> Vec<u32> {
        (start..start + len as u32).collect()
    }

    #[test]
    fn test_has_next_page() {
        assert!(has_next_page(PER_PAGE));
        assert!(!has_next_page(PER_PAGE - 1));
        assert!(!has_next_page(0));
    }

    #[tokio::test]
    async fn test_full_page_then_short_page() {
        let (items, requested) = serve(vec![page(0, PER_PAGE), page(100, 3)]).await;
        assert_eq!(items.len(), PER_PAGE + 3);
        assert_eq!(items.last(), Some(&102));
        assert_eq!(requested, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_exactly_full_last_page() {
        let (items, requested) = serve(vec![page(0, PER_PAGE), page(100, PER_PAGE)]).await;
        assert_eq!(items.len(), 2 * PER_PAGE);
        // The empty third page ends the listing
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_single_short_page() {
        let (items, requested) = serve(vec![page(0, 2)]).await;
        assert_eq!(items, vec![0, 1]);
        assert_eq!(requested, vec![1]);
    }

    #[tokio::test]
    async fn test_page_error_stops_listing() {
        let result: Result<Vec<u32>> = collect_pages(|n| {
            std::future::ready(if n == 1 {
                Ok(page(0, PER_PAGE))
            } else {
                Err(Error::Parse("bad page".to_string()))
            })
        })
        .await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_review_entry_conversion() {
        let json = r#"{
            "id": 80,
            "user": { "login": "github-actions[bot]" },
            "body": "Critical files changed.",
            "state": "CHANGES_REQUESTED",
            "submitted_at": "2019-11-17T17:43:43Z"
        }"#;
        let entry: ReviewEntry = serde_json::from_str(json).unwrap();
        let review = Review::from(entry);

        assert_eq!(review.id, 80);
        assert_eq!(review.author, "github-actions[bot]");
        assert_eq!(review.state, ReviewState::ChangesRequested);
        assert!(review.submitted_at.is_some());
    }

    #[test]
    fn test_review_entry_without_user() {
        let entry: ReviewEntry =
            serde_json::from_str(r#"{ "id": 1, "user": null, "state": "COMMENTED" }"#).unwrap();
        let review = Review::from(entry);
        assert_eq!(review.author, "");
        assert!(review.body.is_none());
        assert_eq!(review.state, ReviewState::Commented);
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("APPROVED"), ReviewState::Approved);
        assert_eq!(parse_state("DISMISSED"), ReviewState::Dismissed);
        assert_eq!(parse_state("PENDING"), ReviewState::Pending);
        assert_eq!(parse_state("SOMETHING_NEW"), ReviewState::Other);
    }

    #[test]
    fn test_file_entry() {
        let entry: FileEntry = serde_json::from_str(
            r#"{ "sha": "bbcd538c", "filename": "lib/main.py", "status": "modified", "additions": 2 }"#,
        )
        .unwrap();
        assert_eq!(entry.filename, "lib/main.py");
        assert_eq!(entry.status.as_deref(), Some("modified"));
    }
}
