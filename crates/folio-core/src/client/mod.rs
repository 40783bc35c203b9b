//! Remote data client for the source-hosting API.
//!
//! [`HostingApi`] is the capability the aggregator depends on. Every operation
//! is fail-soft: transport failures and non-success statuses are logged and
//! turned into an empty value, so callers only ever see data or absence.
//! Single-entity lookups return `None` both for "not found" and for other
//! failures; only the log line tells them apart.
//!
//! # Usage
//!
//! ```rust,no_run
//! use folio_core::client::{GitHubClient, HostingApi};
//! use folio_core::config::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> folio_core::Result<()> {
//!     let client = GitHubClient::new(ClientConfig::default())?;
//!     let repos = client.list_repositories("octocat").await;
//!     println!("{} repositories", repos.len());
//!     Ok(())
//! }
//! ```

mod github;
pub mod mock;

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::types::{
    CodeFrequencySample, CommitActivitySample, CommitRecord, IssueRecord, PullRequestRecord,
    ReleaseRecord, RepositoryRecord, TreeEntry,
};

pub use github::GitHubClient;
pub use mock::MockHostingApi;

/// Typed access to the upstream resources the aggregator consumes.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Public repositories of an owner, most recently updated first
    async fn list_repositories(&self, owner: &str) -> Vec<RepositoryRecord>;

    /// A single repository, `None` when missing or on failure
    async fn get_repository(&self, owner: &str, name: &str) -> Option<RepositoryRecord>;

    /// README as raw text
    async fn get_readme(&self, owner: &str, name: &str) -> Option<String>;

    /// Most recent commits on the default branch
    async fn get_commits(&self, owner: &str, name: &str, limit: usize) -> Vec<CommitRecord>;

    /// Bytes of code per language
    async fn get_languages(&self, owner: &str, name: &str) -> BTreeMap<String, u64>;

    /// Last year of weekly commit counts. Retries while the upstream is computing.
    async fn get_commit_activity(&self, owner: &str, name: &str) -> Vec<CommitActivitySample>;

    /// Weekly additions and deletions. Retries while the upstream is computing.
    async fn get_code_frequency(&self, owner: &str, name: &str) -> Vec<CodeFrequencySample>;

    /// Recursive file tree of a branch
    async fn get_tree(&self, owner: &str, name: &str, branch: &str) -> Vec<TreeEntry>;

    /// Decoded text of a file, `None` when missing or on failure
    async fn get_file_content(&self, owner: &str, name: &str, path: &str) -> Option<String>;

    /// Open issues, excluding pull requests
    async fn get_open_issues(&self, owner: &str, name: &str) -> Vec<IssueRecord>;

    async fn get_open_pull_requests(&self, owner: &str, name: &str) -> Vec<PullRequestRecord>;

    /// Releases, newest first
    async fn get_releases(&self, owner: &str, name: &str) -> Vec<ReleaseRecord>;
}
