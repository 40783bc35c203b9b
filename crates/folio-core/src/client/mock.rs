//! In-memory [`HostingApi`] for tests. Returns preset fixtures and counts calls.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::HostingApi;
use crate::types::{
    CodeFrequencySample, CommitActivitySample, CommitRecord, IssueRecord, PullRequestRecord,
    ReleaseRecord, RepositoryRecord, TreeEntry,
};

#[derive(Debug, Clone, Default)]
struct RepoFixture {
    record: Option<RepositoryRecord>,
    readme: Option<String>,
    commits: Vec<CommitRecord>,
    languages: BTreeMap<String, u64>,
    commit_activity: Vec<CommitActivitySample>,
    code_frequency: Vec<CodeFrequencySample>,
    tree: Vec<TreeEntry>,
    files: HashMap<String, String>,
    issues: Vec<IssueRecord>,
    pull_requests: Vec<PullRequestRecord>,
    releases: Vec<ReleaseRecord>,
}

/// Test double for the remote client.
///
/// Every operation yields to the scheduler once before answering, the way a
/// network call would, so concurrent callers interleave.
#[derive(Default)]
pub struct MockHostingApi {
    /// owner -> listed repositories
    listings: Mutex<HashMap<String, Vec<RepositoryRecord>>>,
    /// "owner/name" -> fixtures
    repos: Mutex<HashMap<String, RepoFixture>>,
    /// operation name -> invocation count
    calls: Mutex<HashMap<&'static str, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn repo_key(owner: &str, name: &str) -> String {
    format!("{}/{}", owner, name)
}

impl MockHostingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository: it is listed for `owner` and resolvable by name.
    pub fn add_repository(&self, owner: &str, record: RepositoryRecord) {
        self.fixture(owner, &record.name, |f| f.record = Some(record.clone()));
        lock(&self.listings)
            .entry(owner.to_string())
            .or_default()
            .push(record);
    }

    pub fn set_readme(&self, owner: &str, name: &str, readme: &str) {
        self.fixture(owner, name, |f| f.readme = Some(readme.to_string()));
    }

    pub fn set_commits(&self, owner: &str, name: &str, commits: Vec<CommitRecord>) {
        self.fixture(owner, name, |f| f.commits = commits);
    }

    pub fn set_languages(&self, owner: &str, name: &str, languages: BTreeMap<String, u64>) {
        self.fixture(owner, name, |f| f.languages = languages);
    }

    pub fn set_commit_activity(&self, owner: &str, name: &str, samples: Vec<CommitActivitySample>) {
        self.fixture(owner, name, |f| f.commit_activity = samples);
    }

    pub fn set_code_frequency(&self, owner: &str, name: &str, samples: Vec<CodeFrequencySample>) {
        self.fixture(owner, name, |f| f.code_frequency = samples);
    }

    pub fn set_tree(&self, owner: &str, name: &str, tree: Vec<TreeEntry>) {
        self.fixture(owner, name, |f| f.tree = tree);
    }

    pub fn set_file(&self, owner: &str, name: &str, path: &str, content: &str) {
        self.fixture(owner, name, |f| {
            f.files.insert(path.to_string(), content.to_string());
        });
    }

    pub fn set_issues(&self, owner: &str, name: &str, issues: Vec<IssueRecord>) {
        self.fixture(owner, name, |f| f.issues = issues);
    }

    pub fn set_pull_requests(&self, owner: &str, name: &str, pulls: Vec<PullRequestRecord>) {
        self.fixture(owner, name, |f| f.pull_requests = pulls);
    }

    pub fn set_releases(&self, owner: &str, name: &str, releases: Vec<ReleaseRecord>) {
        self.fixture(owner, name, |f| f.releases = releases);
    }

    /// How many times an operation was invoked, by trait method name.
    pub fn calls(&self, operation: &str) -> usize {
        lock(&self.calls).get(operation).copied().unwrap_or(0)
    }

    /// Total invocations across all operations
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    fn fixture(&self, owner: &str, name: &str, update: impl FnOnce(&mut RepoFixture)) {
        let mut repos = lock(&self.repos);
        update(repos.entry(repo_key(owner, name)).or_default());
    }

    async fn enter<R>(
        &self,
        operation: &'static str,
        owner: &str,
        name: &str,
        read: impl FnOnce(&RepoFixture) -> R,
    ) -> Option<R> {
        *lock(&self.calls).entry(operation).or_insert(0) += 1;
        tokio::task::yield_now().await;
        lock(&self.repos).get(&repo_key(owner, name)).map(read)
    }
}

#[async_trait]
impl HostingApi for MockHostingApi {
    async fn list_repositories(&self, owner: &str) -> Vec<RepositoryRecord> {
        *lock(&self.calls).entry("list_repositories").or_insert(0) += 1;
        tokio::task::yield_now().await;
        lock(&self.listings).get(owner).cloned().unwrap_or_default()
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Option<RepositoryRecord> {
        self.enter("get_repository", owner, name, |f| f.record.clone())
            .await
            .flatten()
    }

    async fn get_readme(&self, owner: &str, name: &str) -> Option<String> {
        self.enter("get_readme", owner, name, |f| f.readme.clone())
            .await
            .flatten()
    }

    async fn get_commits(&self, owner: &str, name: &str, limit: usize) -> Vec<CommitRecord> {
        self.enter("get_commits", owner, name, |f| {
            f.commits.iter().take(limit).cloned().collect()
        })
        .await
        .unwrap_or_default()
    }

    async fn get_languages(&self, owner: &str, name: &str) -> BTreeMap<String, u64> {
        self.enter("get_languages", owner, name, |f| f.languages.clone())
            .await
            .unwrap_or_default()
    }

    async fn get_commit_activity(&self, owner: &str, name: &str) -> Vec<CommitActivitySample> {
        self.enter("get_commit_activity", owner, name, |f| f.commit_activity.clone())
            .await
            .unwrap_or_default()
    }

    async fn get_code_frequency(&self, owner: &str, name: &str) -> Vec<CodeFrequencySample> {
        self.enter("get_code_frequency", owner, name, |f| f.code_frequency.clone())
            .await
            .unwrap_or_default()
    }

    async fn get_tree(&self, owner: &str, name: &str, _branch: &str) -> Vec<TreeEntry> {
        self.enter("get_tree", owner, name, |f| f.tree.clone())
            .await
            .unwrap_or_default()
    }

    async fn get_file_content(&self, owner: &str, name: &str, path: &str) -> Option<String> {
        self.enter("get_file_content", owner, name, |f| f.files.get(path).cloned())
            .await
            .flatten()
    }

    async fn get_open_issues(&self, owner: &str, name: &str) -> Vec<IssueRecord> {
        self.enter("get_open_issues", owner, name, |f| {
            f.issues
                .iter()
                .filter(|issue| !issue.is_pull_request())
                .cloned()
                .collect()
        })
        .await
        .unwrap_or_default()
    }

    async fn get_open_pull_requests(&self, owner: &str, name: &str) -> Vec<PullRequestRecord> {
        self.enter("get_open_pull_requests", owner, name, |f| f.pull_requests.clone())
            .await
            .unwrap_or_default()
    }

    async fn get_releases(&self, owner: &str, name: &str) -> Vec<ReleaseRecord> {
        self.enter("get_releases", owner, name, |f| f.releases.clone())
            .await
            .unwrap_or_default()
    }
}
