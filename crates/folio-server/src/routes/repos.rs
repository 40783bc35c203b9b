//! Repository routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use folio_core::types::{CodeFrequencySample, CommitRecord, RepoDetails, TreeEntry};
use serde::Deserialize;
use std::sync::Arc;

use crate::state::AppState;

/// Branch listed when the tree route is not given one
pub const DEFAULT_BRANCH: &str = "main";
/// Commits returned when the commits route is not given a limit
pub const DEFAULT_COMMIT_LIMIT: usize = 30;
const MAX_COMMIT_LIMIT: usize = 100;

/// Create repository router
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/repos", get(list_default_owner))
        .route("/repos/{owner}", get(list_repos))
        .route("/repos/{owner}/{name}", get(get_details))
        .route("/repos/{owner}/{name}/tree", get(get_tree))
        .route("/repos/{owner}/{name}/file", get(get_file))
        .route("/repos/{owner}/{name}/commits", get(get_commits))
        .route("/repos/{owner}/{name}/code-frequency", get(get_code_frequency))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub enriched: bool,
    pub exclude_archived: Option<bool>,
    pub exclude_forks: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommitsQuery {
    pub limit: Option<usize>,
}

/// List repositories: summaries, or the enriched listing with `enriched=true`
pub async fn list_repos(
    State(state): State<Arc<AppState>>,
    Path(owner): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    list_for(&state, &owner, query).await
}

/// List repositories of the configured default owner
pub async fn list_default_owner(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, (StatusCode, String)> {
    let owner = state.default_owner().ok_or((
        StatusCode::BAD_REQUEST,
        "No default owner configured".to_string(),
    ))?;
    Ok(list_for(&state, owner, query).await)
}

async fn list_for(state: &AppState, owner: &str, query: ListQuery) -> Response {
    if query.enriched {
        let repos = state
            .aggregator
            .list_enriched(
                owner,
                query.exclude_archived.unwrap_or(true),
                query.exclude_forks.unwrap_or(true),
            )
            .await;
        Json(repos).into_response()
    } else {
        Json(state.aggregator.list_repositories(owner).await).into_response()
    }
}

/// Full details bundle for one repository
pub async fn get_details(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<RepoDetails>, (StatusCode, String)> {
    state
        .aggregator
        .repo_details(&owner, &name)
        .await
        .map(Json)
        .ok_or((
            StatusCode::NOT_FOUND,
            format!("Repository {}/{} not found", owner, name),
        ))
}

pub async fn get_tree(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<TreeQuery>,
) -> Json<Vec<TreeEntry>> {
    let branch = query.branch.as_deref().unwrap_or(DEFAULT_BRANCH);
    Json(state.aggregator.repository_tree(&owner, &name, branch).await)
}

/// Raw text of one file
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<FileQuery>,
) -> Result<String, (StatusCode, String)> {
    let path = query
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "Missing path parameter".to_string()))?;

    state
        .aggregator
        .file_content(&owner, &name, &path)
        .await
        .ok_or((StatusCode::NOT_FOUND, format!("File {} not found", path)))
}

pub async fn get_commits(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<CommitsQuery>,
) -> Json<Vec<CommitRecord>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_COMMIT_LIMIT)
        .clamp(1, MAX_COMMIT_LIMIT);
    Json(state.aggregator.recent_commits(&owner, &name, limit).await)
}

pub async fn get_code_frequency(
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
) -> Json<Vec<CodeFrequencySample>> {
    Json(state.aggregator.code_frequency(&owner, &name).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{request, seeded_app};
    use axum::http::Method;

    #[tokio::test]
    async fn test_list_summaries_by_default() {
        let (app, _) = seeded_app();
        let (status, body) = request(app, Method::GET, "/api/repos/octo").await;

        assert_eq!(status, StatusCode::OK);
        let repos = body.as_array().unwrap();
        assert_eq!(repos.len(), 3);
        assert_eq!(repos[0]["name"], "alpha");
        assert!(repos[0].get("activityStatus").is_none());
    }

    #[tokio::test]
    async fn test_enriched_listing_excludes_by_default() {
        let (app, _) = seeded_app();
        let (status, body) = request(app, Method::GET, "/api/repos/octo?enriched=true").await;

        assert_eq!(status, StatusCode::OK);
        let repos = body.as_array().unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0]["name"], "alpha");
        assert_eq!(repos[0]["activityStatus"], "active");
    }

    #[tokio::test]
    async fn test_enriched_listing_flags() {
        let (app, _) = seeded_app();
        let (_, body) = request(
            app,
            Method::GET,
            "/api/repos/octo?enriched=true&excludeArchived=false&excludeForks=false",
        )
        .await;

        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_default_owner_route() {
        let (app, _) = seeded_app();
        let (status, body) = request(app, Method::GET, "/api/repos").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_details_and_not_found() {
        let (app, _) = seeded_app();
        let (status, body) = request(app.clone(), Method::GET, "/api/repos/octo/alpha").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["repo"]["name"], "alpha");
        assert_eq!(body["readme"], "# alpha");

        let (status, _) = request(app, Method::GET, "/api/repos/octo/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_file_route() {
        let (app, _) = seeded_app();

        let (status, body) =
            request(app.clone(), Method::GET, "/api/repos/octo/alpha/file?path=Cargo.toml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[package]");

        let (status, _) = request(app.clone(), Method::GET, "/api/repos/octo/alpha/file").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            request(app, Method::GET, "/api/repos/octo/alpha/file?path=nope.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_commits_limit_is_clamped() {
        let (app, mock) = seeded_app();
        let (status, body) =
            request(app, Method::GET, "/api/repos/octo/alpha/commits?limit=500").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(mock.calls("get_commits"), 1);
    }

    #[tokio::test]
    async fn test_tree_and_code_frequency() {
        let (app, _) = seeded_app();

        let (status, body) = request(app.clone(), Method::GET, "/api/repos/octo/alpha/tree").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["path"], "src/main.rs");
        assert_eq!(body[0]["type"], "blob");

        let (status, body) =
            request(app, Method::GET, "/api/repos/octo/alpha/code-frequency").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["additions"], 12);
    }
}
