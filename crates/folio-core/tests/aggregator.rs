//! Aggregator integration tests against the in-memory client

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use folio_core::types::{
    ActivityStatus, CommitActivitySample, IssueRecord, PullRequestRecord, ReleaseRecord,
    RepositoryRecord,
};
use folio_core::{Aggregator, MockHostingApi, TtlCache};

const OWNER: &str = "octo";

fn record(name: &str, updated_days_ago: i64) -> RepositoryRecord {
    let now = Utc::now();
    RepositoryRecord {
        id: name.len() as u64,
        name: name.to_string(),
        full_name: format!("{}/{}", OWNER, name),
        description: None,
        html_url: format!("https://github.com/{}/{}", OWNER, name),
        homepage: None,
        stargazers_count: 0,
        forks_count: 0,
        watchers_count: 0,
        language: None,
        topics: Vec::new(),
        created_at: now - chrono::Duration::days(400),
        updated_at: now - chrono::Duration::days(updated_days_ago),
        pushed_at: None,
        archived: false,
        fork: false,
        size: 1,
        default_branch: Some("main".to_string()),
    }
}

/// Thirteen recent weeks with one commit each
fn steady_activity() -> Vec<CommitActivitySample> {
    let this_week = Utc::now().timestamp() - 7 * 86_400;
    (0..13)
        .rev()
        .map(|i| CommitActivitySample {
            week: this_week - i * 7 * 86_400,
            days: [0, 1, 0, 0, 0, 0, 0],
            total: 1,
        })
        .collect()
}

fn issue(number: u64, is_pull: bool) -> IssueRecord {
    IssueRecord {
        number,
        title: format!("issue {}", number),
        state: "open".to_string(),
        html_url: String::new(),
        created_at: Utc::now(),
        user: None,
        pull_request: is_pull.then(|| serde_json::json!({ "url": "" })),
    }
}

fn pull(number: u64) -> PullRequestRecord {
    PullRequestRecord {
        number,
        title: format!("pr {}", number),
        state: "open".to_string(),
        html_url: String::new(),
        created_at: Utc::now(),
        user: None,
        draft: false,
    }
}

fn release(tag: &str, published_at: Option<DateTime<Utc>>) -> ReleaseRecord {
    ReleaseRecord {
        tag_name: tag.to_string(),
        name: None,
        html_url: String::new(),
        draft: false,
        prerelease: false,
        published_at,
    }
}

/// One active repo, one stable repo, one archived repo and one fork.
fn seeded_mock() -> Arc<MockHostingApi> {
    let mock = Arc::new(MockHostingApi::new());

    let mut alpha = record("alpha", 2);
    alpha.language = Some("Rust".to_string());
    alpha.topics = vec!["cli".to_string(), "rust".to_string()];
    alpha.stargazers_count = 10;
    mock.add_repository(OWNER, alpha);
    mock.set_commit_activity(OWNER, "alpha", steady_activity());
    mock.set_releases(OWNER, "alpha", vec![release("v1.0.0", Some(Utc::now()))]);
    mock.set_issues(OWNER, "alpha", vec![issue(1, false), issue(2, true)]);
    mock.set_pull_requests(OWNER, "alpha", vec![pull(2)]);

    let mut beta = record("beta", 45);
    beta.language = Some("TypeScript".to_string());
    beta.topics = vec!["web".to_string(), "cli".to_string()];
    beta.stargazers_count = 5;
    mock.add_repository(OWNER, beta);

    let mut old = record("old", 500);
    old.archived = true;
    old.language = Some("Go".to_string());
    mock.add_repository(OWNER, old);

    let mut forked = record("forked", 1);
    forked.fork = true;
    forked.language = Some("Go".to_string());
    mock.add_repository(OWNER, forked);

    mock
}

fn aggregator(mock: &Arc<MockHostingApi>) -> Aggregator {
    Aggregator::new(mock.clone(), Arc::new(TtlCache::new()))
}

#[tokio::test]
async fn test_list_enriched_applies_filters() {
    let mock = seeded_mock();
    let agg = aggregator(&mock);

    let names = |repos: Vec<folio_core::types::EnrichedRepository>| -> Vec<String> {
        repos.into_iter().map(|r| r.repo.name).collect()
    };

    assert_eq!(names(agg.list_enriched(OWNER, true, true).await), vec!["alpha", "beta"]);
    assert_eq!(
        names(agg.list_enriched(OWNER, true, false).await),
        vec!["alpha", "beta", "forked"]
    );
    assert_eq!(
        names(agg.list_enriched(OWNER, false, false).await),
        vec!["alpha", "beta", "old", "forked"]
    );

    // Each flag combination is its own cache entry
    let keys = agg.cache_stats().keys;
    assert!(keys.contains(&"repos:enriched:octo:true:true".to_string()));
    assert!(keys.contains(&"repos:enriched:octo:true:false".to_string()));
    assert!(keys.contains(&"repos:enriched:octo:false:false".to_string()));
}

#[tokio::test]
async fn test_list_enriched_derives_fields() {
    let mock = seeded_mock();
    let agg = aggregator(&mock);

    let repos = agg.list_enriched(OWNER, false, false).await;
    let alpha = &repos[0];
    assert_eq!(alpha.activity_status, ActivityStatus::Active);
    assert_eq!(alpha.commit_velocity, 30);
    assert_eq!(alpha.release_info.as_ref().unwrap().latest_version, "v1.0.0");
    let metrics = alpha.metrics.unwrap();
    assert_eq!(metrics.open_issues, 1);
    assert_eq!(metrics.open_prs, 1);
    assert_eq!(metrics.total_releases, 1);
    assert!(alpha.stack.is_none());

    assert_eq!(repos[1].activity_status, ActivityStatus::Stable);
    assert_eq!(repos[2].activity_status, ActivityStatus::Archived);
}

#[tokio::test]
async fn test_missing_auxiliary_data_uses_neutral_defaults() {
    let mock = seeded_mock();
    let agg = aggregator(&mock);

    let repos = agg.list_enriched(OWNER, true, true).await;
    let beta = repos.iter().find(|r| r.repo.name == "beta").unwrap();

    assert_eq!(beta.commit_velocity, 0);
    assert!(beta.release_info.is_none());
    let metrics = beta.metrics.unwrap();
    assert_eq!(metrics.open_issues, 0);
    assert_eq!(metrics.open_prs, 0);
    assert_eq!(metrics.total_releases, 0);
}

#[tokio::test]
async fn test_cache_hit_skips_upstream() {
    let mock = seeded_mock();
    let agg = aggregator(&mock);

    let first = agg.list_enriched(OWNER, true, true).await;
    let calls_after_first = mock.total_calls();
    let second = agg.list_enriched(OWNER, true, true).await;

    assert_eq!(first, second);
    assert_eq!(mock.total_calls(), calls_after_first);
    assert_eq!(mock.calls("list_repositories"), 1);
    assert_eq!(mock.calls("get_commit_activity"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_is_refetched() {
    let mock = seeded_mock();
    let agg = aggregator(&mock);

    agg.list_repositories(OWNER).await;
    tokio::time::advance(Duration::from_secs(59 * 60)).await;
    agg.list_repositories(OWNER).await;
    assert_eq!(mock.calls("list_repositories"), 1);

    tokio::time::advance(Duration::from_secs(60)).await;
    agg.list_repositories(OWNER).await;
    assert_eq!(mock.calls("list_repositories"), 2);
}

#[tokio::test]
async fn test_concurrent_misses_both_fetch() {
    let mock = seeded_mock();
    let agg = aggregator(&mock);

    let (a, b) = tokio::join!(agg.list_repositories(OWNER), agg.list_repositories(OWNER));

    assert_eq!(a, b);
    assert_eq!(mock.calls("list_repositories"), 2);
    assert_eq!(agg.cache_stats().size, 1);
}

#[tokio::test]
async fn test_empty_listing_is_not_cached() {
    let mock = Arc::new(MockHostingApi::new());
    let agg = aggregator(&mock);

    assert!(agg.list_enriched("nobody", true, true).await.is_empty());
    assert!(agg.list_enriched("nobody", true, true).await.is_empty());

    assert_eq!(mock.calls("list_repositories"), 2);
    assert_eq!(agg.cache_stats().size, 0);
}

#[tokio::test]
async fn test_rollups_track_recovered_listing() {
    let mock = Arc::new(MockHostingApi::new());
    let agg = aggregator(&mock);

    assert_eq!(agg.portfolio_metrics(OWNER).await.total_repos, 0);
    assert!(agg.list_repositories(OWNER).await.is_empty());
    assert_eq!(agg.cache_stats().size, 0);

    mock.add_repository(OWNER, record("alpha", 2));

    assert_eq!(agg.list_enriched(OWNER, true, true).await.len(), 1);
    assert_eq!(agg.portfolio_metrics(OWNER).await.total_repos, 1);
    assert_eq!(agg.list_repositories(OWNER).await.len(), 1);
    assert!(agg.cache_stats().keys.contains(&"portfolio:octo".to_string()));
}

#[tokio::test]
async fn test_repo_details_bundle() {
    let mock = seeded_mock();
    mock.set_readme(OWNER, "alpha", "# alpha");
    mock.set_languages(
        OWNER,
        "alpha",
        BTreeMap::from([("Rust".to_string(), 9000), ("Shell".to_string(), 120)]),
    );
    mock.set_file(
        OWNER,
        "alpha",
        "package.json",
        r#"{"dependencies": {"react": "18"}, "devDependencies": {"jest": "29"}}"#,
    );
    let agg = aggregator(&mock);

    let details = agg.repo_details(OWNER, "alpha").await.unwrap();

    assert_eq!(details.readme.as_deref(), Some("# alpha"));
    assert_eq!(details.languages.get("Rust"), Some(&9000));
    assert_eq!(details.stack.frameworks, vec!["react"]);
    assert_eq!(details.stack.testing, vec!["jest"]);
    assert_eq!(details.repo.stack.as_ref(), Some(&details.stack));
    assert_eq!(details.issues, 1);
    assert_eq!(details.pull_requests, 1);
    assert_eq!(details.releases.len(), 1);
    assert_eq!(details.activity_graph.weeks.len(), 13);
    assert_eq!(details.activity_graph.metrics.total_commits, 13);
    assert_eq!(
        details.activity_graph.metrics.most_active_day.as_deref(),
        Some("Monday")
    );

    agg.repo_details(OWNER, "alpha").await.unwrap();
    assert_eq!(mock.calls("get_repository"), 1);
    assert_eq!(mock.calls("get_file_content"), 2);
}

#[tokio::test]
async fn test_missing_repository_is_not_cached() {
    let mock = seeded_mock();
    let agg = aggregator(&mock);

    assert!(agg.repo_details(OWNER, "ghost").await.is_none());
    assert_eq!(agg.cache_stats().size, 0);
    // Stack detection is skipped for a missing repository
    assert_eq!(mock.calls("get_file_content"), 0);

    assert!(agg.repo_details(OWNER, "ghost").await.is_none());
    assert_eq!(mock.calls("get_repository"), 2);
}

#[tokio::test]
async fn test_portfolio_excludes_archived_and_forks() {
    let mock = seeded_mock();
    let agg = aggregator(&mock);

    let metrics = agg.portfolio_metrics(OWNER).await;

    assert_eq!(metrics.total_repos, 2);
    assert_eq!(metrics.active_projects, 1);
    assert_eq!(metrics.total_stars, 15);
    assert_eq!(metrics.total_commits, 360);
    let langs: Vec<&str> = metrics
        .primary_languages
        .iter()
        .map(|l| l.lang.as_str())
        .collect();
    assert_eq!(langs, vec!["Rust", "TypeScript"]);
    assert_eq!(metrics.domains, vec!["cli", "rust", "web"]);

    let again = agg.portfolio_metrics(OWNER).await;
    assert_eq!(again, metrics);
    assert_eq!(mock.calls("list_repositories"), 1);
}

#[tokio::test]
async fn test_file_content_absence_is_not_cached() {
    let mock = seeded_mock();
    mock.set_file(OWNER, "alpha", "Cargo.toml", "[package]");
    let agg = aggregator(&mock);

    assert_eq!(
        agg.file_content(OWNER, "alpha", "Cargo.toml").await.as_deref(),
        Some("[package]")
    );
    assert!(agg.file_content(OWNER, "alpha", "missing.txt").await.is_none());

    let keys = agg.cache_stats().keys;
    assert_eq!(keys, vec!["file-content:octo:alpha:Cargo.toml".to_string()]);
}

#[tokio::test]
async fn test_invalidate_owner_leaves_other_owners() {
    let mock = seeded_mock();
    mock.add_repository("other", record("gamma", 3));
    let agg = aggregator(&mock);

    agg.list_repositories(OWNER).await;
    agg.list_enriched(OWNER, true, true).await;
    agg.recent_commits(OWNER, "alpha", 5).await;
    agg.list_repositories("other").await;

    let removed = agg.invalidate_owner(OWNER);

    assert_eq!(removed, 3);
    assert_eq!(agg.cache_stats().keys, vec!["repos:list:other".to_string()]);
}

#[tokio::test]
async fn test_cache_hit_resolves_on_first_poll() {
    use tokio_test::{assert_pending, assert_ready, task};

    let mock = seeded_mock();
    let agg = aggregator(&mock);

    // A miss waits on the upstream call
    let mut miss = task::spawn(agg.list_repositories(OWNER));
    assert_pending!(miss.poll());
    let first = assert_ready!(miss.poll());

    let mut hit = task::spawn(agg.list_repositories(OWNER));
    let second = assert_ready!(hit.poll());

    assert_eq!(first, second);
    assert_eq!(mock.calls("list_repositories"), 1);
}
