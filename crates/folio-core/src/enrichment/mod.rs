//! Enrichment pipeline - derived project intelligence from raw upstream data.
//!
//! Everything here except [`detect_stack`] is a pure function of its inputs
//! and an explicit `now`, so an enriched repository recomputed from the same
//! record and samples is identical field for field.

mod activity;
mod graph;
mod stack;
mod velocity;

use chrono::{DateTime, Utc};

use crate::types::{
    CommitActivitySample, EnrichedRepository, ProjectStack, ReleaseInfo, ReleaseRecord,
    RepoMetrics, RepositoryRecord,
};

pub use activity::{ACTIVE_DAYS, STABLE_DAYS, classify_activity_status, days_since};
pub use graph::{GRAPH_WEEKS, build_activity_graph};
pub use stack::{
    PACKAGE_JSON, REQUIREMENTS_TXT, StackPattern, apply_patterns, detect_stack,
    detect_stack_from_manifests, package_json_search_text, requirements_search_text,
    stack_patterns,
};
pub use velocity::{VELOCITY_WEEKS, commit_velocity};

/// Latest release, if the newest one has been published.
pub fn latest_release(releases: &[ReleaseRecord]) -> Option<ReleaseInfo> {
    let newest = releases.first()?;
    newest.published_at.map(|published| ReleaseInfo {
        latest_version: newest.tag_name.clone(),
        release_date: published,
    })
}

/// Derive every enrichment field for one repository.
pub fn enrich_repository(
    repo: RepositoryRecord,
    activity: &[CommitActivitySample],
    releases: &[ReleaseRecord],
    metrics: Option<RepoMetrics>,
    stack: Option<ProjectStack>,
    now: DateTime<Utc>,
) -> EnrichedRepository {
    let days_since_last_update = days_since(repo.updated_at, now);

    EnrichedRepository {
        activity_status: classify_activity_status(days_since_last_update, repo.archived),
        days_since_last_update,
        commit_velocity: commit_velocity(activity),
        release_info: latest_release(releases),
        metrics,
        stack,
        repo,
    }
}
