//! reqwest-backed implementation of [`HostingApi`].

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::HostingApi;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{
    CodeFrequencySample, CommitActivitySample, CommitRecord, IssueRecord, PullRequestRecord,
    ReleaseRecord, RepositoryRecord, TreeEntry,
};

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const PAGE_SIZE: usize = 100;

/// Client for the GitHub REST API
#[derive(Clone)]
pub struct GitHubClient {
    config: ClientConfig,
    /// HTTP client
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

impl GitHubClient {
    /// Create a client from configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        if config.bearer_token().is_none() {
            debug!("No API token configured, using anonymous access");
        }

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a GET and classify the status. 404 and 202 get their own variants.
    async fn send(&self, path: &str, accept: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.config.base_url(), path);
        debug!("API request: GET {}", url);

        let mut req = self.client.get(&url).header(ACCEPT, accept);
        if let Some(token) = self.config.bearer_token() {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            Err(Error::NotFound(path.to_string()))
        } else if status == StatusCode::ACCEPTED {
            Err(Error::Pending(path.to_string()))
        } else if status.is_success() {
            Ok(resp)
        } else {
            Err(Error::status(status.as_u16(), url))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.send(path, JSON_MEDIA_TYPE).await?;
        resp.json()
            .await
            .map_err(|e| Error::Decode(format!("{}: {}", path, e)))
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let resp = self.send(path, RAW_MEDIA_TYPE).await?;
        Ok(resp.text().await?)
    }

    /// Stats endpoints answer 202 while the upstream computes them. Retry a
    /// bounded number of times with a fixed delay, then give up with nothing.
    async fn get_stats<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        let mut retries_left = self.config.pending_retries;

        loop {
            match self.send(path, JSON_MEDIA_TYPE).await {
                Ok(resp) if resp.status() == StatusCode::NO_CONTENT => return Vec::new(),
                Ok(resp) => {
                    return match resp.json::<Vec<T>>().await {
                        Ok(samples) => samples,
                        Err(e) => {
                            warn!(path = %path, error = %e, "Failed to decode statistics");
                            Vec::new()
                        }
                    };
                }
                Err(Error::Pending(_)) if retries_left > 0 => {
                    retries_left -= 1;
                    debug!(
                        path = %path,
                        retries_left = retries_left,
                        "Statistics still computing, retrying"
                    );
                    tokio::time::sleep(self.config.pending_retry_delay()).await;
                }
                Err(Error::Pending(_)) => {
                    warn!(path = %path, "Statistics still computing after retries, giving up");
                    return Vec::new();
                }
                Err(e) => return or_empty(path, Err(e)),
            }
        }
    }

    fn repo_path(owner: &str, name: &str) -> String {
        format!("/repos/{}/{}", owner, name)
    }
}

/// Collapse a failed listing into its empty default.
fn or_empty<T: Default>(path: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path, error = %e, "Upstream request failed, using empty default");
            T::default()
        }
    }
}

/// Collapse a failed single-entity lookup into `None`.
fn or_absent<T>(path: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(Error::NotFound(_)) => {
            debug!(path = %path, "Upstream entity not found");
            None
        }
        Err(e) => {
            warn!(path = %path, error = %e, "Upstream lookup failed");
            None
        }
    }
}

fn decode_content(content: ContentResponse) -> Result<String> {
    if content.encoding != "base64" {
        return Err(Error::Decode(format!(
            "unsupported content encoding {:?}",
            content.encoding
        )));
    }

    let compact: String = content
        .content
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| Error::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Decode(e.to_string()))
}

#[async_trait]
impl HostingApi for GitHubClient {
    async fn list_repositories(&self, owner: &str) -> Vec<RepositoryRecord> {
        let path = format!("/users/{}/repos?per_page={}&sort=updated", owner, PAGE_SIZE);
        or_empty(&path, self.get_json(&path).await)
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Option<RepositoryRecord> {
        let path = Self::repo_path(owner, name);
        or_absent(&path, self.get_json(&path).await)
    }

    async fn get_readme(&self, owner: &str, name: &str) -> Option<String> {
        let path = format!("{}/readme", Self::repo_path(owner, name));
        or_absent(&path, self.get_text(&path).await)
    }

    async fn get_commits(&self, owner: &str, name: &str, limit: usize) -> Vec<CommitRecord> {
        let path = format!(
            "{}/commits?per_page={}",
            Self::repo_path(owner, name),
            limit.clamp(1, PAGE_SIZE)
        );
        let mut commits: Vec<CommitRecord> = or_empty(&path, self.get_json(&path).await);
        commits.truncate(limit);
        commits
    }

    async fn get_languages(&self, owner: &str, name: &str) -> BTreeMap<String, u64> {
        let path = format!("{}/languages", Self::repo_path(owner, name));
        or_empty(&path, self.get_json(&path).await)
    }

    async fn get_commit_activity(&self, owner: &str, name: &str) -> Vec<CommitActivitySample> {
        let path = format!("{}/stats/commit_activity", Self::repo_path(owner, name));
        self.get_stats(&path).await
    }

    async fn get_code_frequency(&self, owner: &str, name: &str) -> Vec<CodeFrequencySample> {
        let path = format!("{}/stats/code_frequency", Self::repo_path(owner, name));
        self.get_stats(&path).await
    }

    async fn get_tree(&self, owner: &str, name: &str, branch: &str) -> Vec<TreeEntry> {
        let path = format!(
            "{}/git/trees/{}?recursive=1",
            Self::repo_path(owner, name),
            branch
        );
        match self.get_json::<TreeResponse>(&path).await {
            Ok(resp) => {
                if resp.truncated {
                    warn!(path = %path, entries = resp.tree.len(), "Tree listing truncated by upstream");
                }
                resp.tree
            }
            Err(e) => or_empty(&path, Err(e)),
        }
    }

    async fn get_file_content(&self, owner: &str, name: &str, path: &str) -> Option<String> {
        let api_path = match encode_path(path) {
            Ok(encoded) => format!("{}/contents/{}", Self::repo_path(owner, name), encoded),
            Err(e) => return or_absent(path, Err(e)),
        };
        let result = match self.get_json::<ContentResponse>(&api_path).await {
            Ok(content) => decode_content(content),
            Err(e) => Err(e),
        };
        or_absent(&api_path, result)
    }

    async fn get_open_issues(&self, owner: &str, name: &str) -> Vec<IssueRecord> {
        let path = format!(
            "{}/issues?state=open&per_page={}",
            Self::repo_path(owner, name),
            PAGE_SIZE
        );
        let issues: Vec<IssueRecord> = or_empty(&path, self.get_json(&path).await);
        issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .collect()
    }

    async fn get_open_pull_requests(&self, owner: &str, name: &str) -> Vec<PullRequestRecord> {
        let path = format!(
            "{}/pulls?state=open&per_page={}",
            Self::repo_path(owner, name),
            PAGE_SIZE
        );
        or_empty(&path, self.get_json(&path).await)
    }

    async fn get_releases(&self, owner: &str, name: &str) -> Vec<ReleaseRecord> {
        let path = format!(
            "{}/releases?per_page={}",
            Self::repo_path(owner, name),
            PAGE_SIZE
        );
        or_empty(&path, self.get_json(&path).await)
    }
}

/// Percent-encode each segment of a repository file path. Empty segments are dropped.
fn encode_path(path: &str) -> Result<String> {
    let mut url = reqwest::Url::parse("http://localhost/")
        .map_err(|e| Error::Other(format!("Failed to build path URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Other("URL cannot carry path segments".into()))?
        .clear()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url.path().trim_start_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new(ClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClientConfig::default().with_api_url("not-a-url");
        assert!(GitHubClient::new(config).is_err());
    }

    #[test]
    fn test_decode_content_with_line_breaks() {
        let content = ContentResponse {
            content: "eyJuYW1lIjoi\nYXBwIn0=\n".to_string(),
            encoding: "base64".to_string(),
        };
        assert_eq!(decode_content(content).unwrap(), r#"{"name":"app"}"#);
    }

    #[test]
    fn test_decode_content_rejects_unknown_encoding() {
        let content = ContentResponse {
            content: "abc".to_string(),
            encoding: "none".to_string(),
        };
        assert!(decode_content(content).is_err());
    }

    #[test]
    fn test_encode_path_escapes_reserved_characters() {
        assert_eq!(encode_path("docs/a#b?.md").unwrap(), "docs/a%23b%3F.md");
        assert_eq!(encode_path("/src//100% done.txt").unwrap(), "src/100%25%20done.txt");
        assert_eq!(encode_path("package.json").unwrap(), "package.json");
    }

    #[test]
    fn test_or_absent_maps_errors_to_none() {
        let missing: Option<u8> = or_absent("/x", Err(Error::NotFound("/x".into())));
        assert!(missing.is_none());

        let failed: Option<u8> = or_absent("/x", Err(Error::status(500, "/x")));
        assert!(failed.is_none());

        assert_eq!(or_absent("/x", Ok(3u8)), Some(3));
    }

    #[test]
    fn test_or_empty_maps_errors_to_default() {
        let empty: Vec<u8> = or_empty("/x", Err(Error::status(403, "/x")));
        assert!(empty.is_empty());
    }
}
