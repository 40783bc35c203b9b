//! Aggregator - cache-backed orchestration over the remote client.
//!
//! Each public operation checks the cache under its own namespace, fans out
//! the upstream calls it needs concurrently, runs enrichment and writes the
//! result back as one unit.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Aggregator                              │
//! │  ┌─────────────┐   ┌─────────────────┐   ┌────────────────────┐  │
//! │  │ Cache check │ → │ Fan-out fetches │ → │ Enrichment + write │  │
//! │  └─────────────┘   └─────────────────┘   └────────────────────┘  │
//! │         │                   │                      │             │
//! │      TtlCache           HostingApi             TtlCache          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Partial upstream failures never fail a batch: the client already turns them
//! into empty values, which enrich to neutral defaults. Concurrent misses on
//! the same key are not de-duplicated.

mod portfolio;

pub use portfolio::{TOP_LANGUAGES, compute_portfolio};

use chrono::Utc;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheTtl, TtlCache};
use crate::client::HostingApi;
use crate::enrichment::{build_activity_graph, detect_stack, enrich_repository};
use crate::types::{
    CodeFrequencySample, CommitRecord, EnrichedRepository, PortfolioMetrics, RepoDetails,
    RepoMetrics, RepoSummary, RepositoryRecord, TreeEntry,
};

/// Cache namespaces owned by the aggregator
pub mod namespace {
    pub const REPOS_LIST: &str = "repos:list";
    pub const REPOS_ENRICHED: &str = "repos:enriched";
    pub const REPO_DETAILS: &str = "repo-details";
    pub const PORTFOLIO: &str = "portfolio";
    pub const COMMITS: &str = "commits";
    pub const CODE_FREQUENCY: &str = "code-frequency";
    pub const TREE: &str = "tree";
    pub const FILE_CONTENT: &str = "file-content";

    /// Every namespace whose first key argument is the owner
    pub const OWNER_SCOPED: [&str; 8] = [
        REPOS_LIST,
        REPOS_ENRICHED,
        REPO_DETAILS,
        PORTFOLIO,
        COMMITS,
        CODE_FREQUENCY,
        TREE,
        FILE_CONTENT,
    ];
}

/// Commits included in a details bundle
pub const DETAIL_COMMIT_LIMIT: usize = 20;

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Cache-backed aggregation service
pub struct Aggregator {
    api: Arc<dyn HostingApi>,
    cache: Arc<TtlCache>,
}

impl Aggregator {
    /// Create an aggregator over an explicit client and cache
    pub fn new(api: Arc<dyn HostingApi>, cache: Arc<TtlCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    /// Serve from cache, or compute and store.
    async fn cached<T, F>(&self, namespace: &str, ttl: CacheTtl, args: &[&str], fetch: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: Future<Output = T>,
    {
        if let Some(hit) = self.cache.get::<T>(namespace, args) {
            return hit;
        }

        let value = fetch.await;
        self.cache.set(namespace, ttl, value.clone(), args);
        value
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Repository Lists
    // ─────────────────────────────────────────────────────────────────────────

    /// Lightweight listing of an owner's repositories. An empty upstream
    /// listing is returned without being cached.
    pub async fn list_repositories(&self, owner: &str) -> Vec<RepoSummary> {
        if let Some(hit) = self
            .cache
            .get::<Vec<RepoSummary>>(namespace::REPOS_LIST, &[owner])
        {
            return hit;
        }

        let summaries: Vec<RepoSummary> = self
            .api
            .list_repositories(owner)
            .await
            .iter()
            .map(RepoSummary::from)
            .collect();
        if summaries.is_empty() {
            debug!(owner = %owner, "No repositories listed, skipping cache write");
            return summaries;
        }

        self.cache
            .set(namespace::REPOS_LIST, CacheTtl::Repos, summaries.clone(), &[owner]);
        summaries
    }

    /// Filtered and enriched listing.
    ///
    /// Every surviving repository is enriched independently and concurrently;
    /// one whose auxiliary calls fail keeps neutral defaults. An empty upstream
    /// listing is returned without being cached.
    pub async fn list_enriched(
        &self,
        owner: &str,
        exclude_archived: bool,
        exclude_forks: bool,
    ) -> Vec<EnrichedRepository> {
        let args = [owner, flag(exclude_archived), flag(exclude_forks)];
        if let Some(hit) = self
            .cache
            .get::<Vec<EnrichedRepository>>(namespace::REPOS_ENRICHED, &args)
        {
            return hit;
        }

        let listed = self.api.list_repositories(owner).await;
        if listed.is_empty() {
            debug!(owner = %owner, "No repositories listed, skipping cache write");
            return Vec::new();
        }

        let selected: Vec<RepositoryRecord> = listed
            .into_iter()
            .filter(|r| !(exclude_archived && r.archived))
            .filter(|r| !(exclude_forks && r.fork))
            .collect();

        let now = Utc::now();
        let enriched = join_all(
            selected
                .into_iter()
                .map(|repo| self.enrich_listed(owner, repo, now)),
        )
        .await;

        info!(
            owner = %owner,
            count = enriched.len(),
            exclude_archived = exclude_archived,
            exclude_forks = exclude_forks,
            "Enriched repository list"
        );

        self.cache.set(
            namespace::REPOS_ENRICHED,
            CacheTtl::Repos,
            enriched.clone(),
            &args,
        );
        enriched
    }

    async fn enrich_listed(
        &self,
        owner: &str,
        repo: RepositoryRecord,
        now: chrono::DateTime<Utc>,
    ) -> EnrichedRepository {
        let name = repo.name.clone();
        let (activity, releases, issues, pulls) = tokio::join!(
            self.api.get_commit_activity(owner, &name),
            self.api.get_releases(owner, &name),
            self.api.get_open_issues(owner, &name),
            self.api.get_open_pull_requests(owner, &name),
        );

        let metrics = RepoMetrics {
            open_issues: issues.len(),
            open_prs: pulls.len(),
            total_releases: releases.len(),
        };

        enrich_repository(repo, &activity, &releases, Some(metrics), None, now)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Repository Details
    // ─────────────────────────────────────────────────────────────────────────

    /// Full details bundle. `None` when the repository does not exist (or the
    /// lookup failed); absence is never cached.
    pub async fn repo_details(&self, owner: &str, name: &str) -> Option<RepoDetails> {
        let args = [owner, name];
        if let Some(hit) = self.cache.get::<RepoDetails>(namespace::REPO_DETAILS, &args) {
            return Some(hit);
        }

        let (repo, readme, commits, languages, activity, issues, pulls, releases) = tokio::join!(
            self.api.get_repository(owner, name),
            self.api.get_readme(owner, name),
            self.api.get_commits(owner, name, DETAIL_COMMIT_LIMIT),
            self.api.get_languages(owner, name),
            self.api.get_commit_activity(owner, name),
            self.api.get_open_issues(owner, name),
            self.api.get_open_pull_requests(owner, name),
            self.api.get_releases(owner, name),
        );

        let Some(repo) = repo else {
            info!(owner = %owner, repo = %name, "Repository not found");
            return None;
        };

        let stack = detect_stack(self.api.as_ref(), owner, name).await;
        let now = Utc::now();

        let metrics = RepoMetrics {
            open_issues: issues.len(),
            open_prs: pulls.len(),
            total_releases: releases.len(),
        };

        let details = RepoDetails {
            repo: enrich_repository(
                repo,
                &activity,
                &releases,
                Some(metrics),
                Some(stack.clone()),
                now,
            ),
            readme,
            commits,
            languages,
            activity_graph: build_activity_graph(&activity, now),
            stack,
            issues: issues.len(),
            pull_requests: pulls.len(),
            releases,
        };

        self.cache.set(
            namespace::REPO_DETAILS,
            CacheTtl::RepoDetails,
            details.clone(),
            &args,
        );
        Some(details)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Portfolio
    // ─────────────────────────────────────────────────────────────────────────

    /// Portfolio rollup. Always built from the listing with archived
    /// repositories and forks excluded, so numbers are comparable across calls.
    /// A rollup over no repositories is not cached.
    pub async fn portfolio_metrics(&self, owner: &str) -> PortfolioMetrics {
        if let Some(hit) = self
            .cache
            .get::<PortfolioMetrics>(namespace::PORTFOLIO, &[owner])
        {
            return hit;
        }

        let repos = self.list_enriched(owner, true, true).await;
        let metrics = compute_portfolio(&repos, Utc::now());
        if repos.is_empty() {
            debug!(owner = %owner, "Empty portfolio, skipping cache write");
            return metrics;
        }

        info!(
            owner = %owner,
            total_repos = metrics.total_repos,
            active = metrics.active_projects,
            "Computed portfolio metrics"
        );
        self.cache
            .set(namespace::PORTFOLIO, CacheTtl::Repos, metrics.clone(), &[owner]);
        metrics
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Raw Resources
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn recent_commits(&self, owner: &str, name: &str, limit: usize) -> Vec<CommitRecord> {
        let limit_arg = limit.to_string();
        self.cached(
            namespace::COMMITS,
            CacheTtl::Commits,
            &[owner, name, limit_arg.as_str()],
            self.api.get_commits(owner, name, limit),
        )
        .await
    }

    pub async fn code_frequency(&self, owner: &str, name: &str) -> Vec<CodeFrequencySample> {
        self.cached(
            namespace::CODE_FREQUENCY,
            CacheTtl::CodeFrequency,
            &[owner, name],
            self.api.get_code_frequency(owner, name),
        )
        .await
    }

    pub async fn repository_tree(&self, owner: &str, name: &str, branch: &str) -> Vec<TreeEntry> {
        self.cached(
            namespace::TREE,
            CacheTtl::Tree,
            &[owner, name, branch],
            self.api.get_tree(owner, name, branch),
        )
        .await
    }

    /// File text; a missing file is not cached.
    pub async fn file_content(&self, owner: &str, name: &str, path: &str) -> Option<String> {
        let args = [owner, name, path];
        if let Some(hit) = self.cache.get::<String>(namespace::FILE_CONTENT, &args) {
            return Some(hit);
        }

        let content = self.api.get_file_content(owner, name, path).await?;
        self.cache.set(
            namespace::FILE_CONTENT,
            CacheTtl::FileContent,
            content.clone(),
            &args,
        );
        Some(content)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cache Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop every cached entry for an owner
    pub fn invalidate_owner(&self, owner: &str) -> usize {
        let removed: usize = namespace::OWNER_SCOPED
            .iter()
            .map(|ns| {
                usize::from(self.cache.invalidate(ns, &[owner]))
                    + self.cache.invalidate_pattern(&format!("{}:{}:", ns, owner))
            })
            .sum();
        info!(owner = %owner, removed = removed, "Invalidated owner cache entries");
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
