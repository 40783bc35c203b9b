//! Shared types for folio-core.
//!
//! Upstream records keep the upstream field names so they deserialize straight
//! from API payloads. Derived types serialize in camelCase for the JSON
//! consumers sitting on top of the aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Upstream Records
// ─────────────────────────────────────────────────────────────────────────────

/// Raw repository metadata as returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// One week of commit history from the weekly commit-activity endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitActivitySample {
    /// Week start as a unix timestamp (seconds, Sunday 00:00 UTC)
    pub week: i64,
    /// Commits per day, Sunday first
    pub days: [u32; 7],
    pub total: u32,
}

/// Weekly additions/deletions, decoded from the upstream `[week, add, del]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, i64, i64)")]
pub struct CodeFrequencySample {
    pub week: i64,
    pub additions: i64,
    pub deletions: i64,
}

impl From<(i64, i64, i64)> for CodeFrequencySample {
    fn from((week, additions, deletions): (i64, i64, i64)) -> Self {
        Self {
            week,
            additions,
            deletions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: CommitDetail,
    #[serde(default)]
    pub author: Option<UserRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitSignature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSignature {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub login: String,
}

/// Entry of a recursive git tree listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    /// "blob" or "tree"
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<UserRef>,
    /// Present when the upstream listed a pull request as an issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl IssueRecord {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Derived Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Active,
    Stable,
    Dormant,
    Archived,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityStatus::Active => write!(f, "active"),
            ActivityStatus::Stable => write!(f, "stable"),
            ActivityStatus::Dormant => write!(f, "dormant"),
            ActivityStatus::Archived => write!(f, "archived"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackCategory {
    Frameworks,
    Databases,
    Auth,
    Infra,
    Testing,
    Other,
}

/// Technology tags grouped by category. Tags are unique per category and keep
/// the order in which they were first detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStack {
    pub frameworks: Vec<String>,
    pub databases: Vec<String>,
    pub auth: Vec<String>,
    pub infra: Vec<String>,
    pub testing: Vec<String>,
    pub other: Vec<String>,
}

impl ProjectStack {
    /// Add a tag to a category unless it is already there.
    pub fn add(&mut self, category: StackCategory, tag: &str) {
        let tags = self.category_mut(category);
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    pub fn category(&self, category: StackCategory) -> &[String] {
        match category {
            StackCategory::Frameworks => &self.frameworks,
            StackCategory::Databases => &self.databases,
            StackCategory::Auth => &self.auth,
            StackCategory::Infra => &self.infra,
            StackCategory::Testing => &self.testing,
            StackCategory::Other => &self.other,
        }
    }

    fn category_mut(&mut self, category: StackCategory) -> &mut Vec<String> {
        match category {
            StackCategory::Frameworks => &mut self.frameworks,
            StackCategory::Databases => &mut self.databases,
            StackCategory::Auth => &mut self.auth,
            StackCategory::Infra => &mut self.infra,
            StackCategory::Testing => &mut self.testing,
            StackCategory::Other => &mut self.other,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frameworks.is_empty()
            && self.databases.is_empty()
            && self.auth.is_empty()
            && self.infra.is_empty()
            && self.testing.is_empty()
            && self.other.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub latest_version: String,
    pub release_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetrics {
    #[serde(rename = "openIssues")]
    pub open_issues: usize,
    #[serde(rename = "openPRs")]
    pub open_prs: usize,
    #[serde(rename = "totalReleases")]
    pub total_releases: usize,
}

/// Repository record plus fields derived by the enrichment pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRepository {
    #[serde(flatten)]
    pub repo: RepositoryRecord,
    pub activity_status: ActivityStatus,
    pub days_since_last_update: f64,
    pub commit_velocity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<ProjectStack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_info: Option<ReleaseInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RepoMetrics>,
}

/// One week of the activity graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityWeek {
    /// Zero-based position in the window
    pub week: usize,
    /// ISO date of the week start
    pub date: String,
    pub commits: u32,
    pub days: [u32; 7],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMetrics {
    pub total_commits: u64,
    pub commits_last_30_days: u64,
    pub commits_last_90_days: u64,
    pub average_commits_per_month: u64,
    pub longest_streak: u32,
    pub current_streak: u32,
    pub most_active_day: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityGraph {
    pub weeks: Vec<ActivityWeek>,
    pub metrics: CommitMetrics,
}

/// Everything shown for a single repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoDetails {
    pub repo: EnrichedRepository,
    pub readme: Option<String>,
    pub commits: Vec<CommitRecord>,
    pub languages: BTreeMap<String, u64>,
    pub activity_graph: ActivityGraph,
    pub stack: ProjectStack,
    pub issues: usize,
    pub pull_requests: usize,
    pub releases: Vec<ReleaseRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub lang: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_repos: usize,
    pub active_projects: usize,
    pub total_stars: u64,
    /// Estimated from velocity, not a historical count
    pub total_commits: u64,
    pub primary_languages: Vec<LanguageCount>,
    pub domains: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Lightweight repository list item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: u64,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub fork: bool,
    pub archived: bool,
}

impl From<&RepositoryRecord> for RepoSummary {
    fn from(repo: &RepositoryRecord) -> Self {
        Self {
            id: repo.id,
            name: repo.name.clone(),
            description: repo.description.clone(),
            url: repo.html_url.clone(),
            stars: repo.stargazers_count,
            language: repo.language.clone(),
            topics: repo.topics.clone(),
            updated_at: repo.updated_at,
            pushed_at: repo.pushed_at,
            fork: repo.fork,
            archived: repo.archived,
        }
    }
}
