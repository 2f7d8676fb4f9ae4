use crate::error::{LocmapError, Result};
use crate::model::{Profile, RepoDescriptor};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

const API_BASE: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    owner: ApiOwner,
    clone_url: String,
}

impl From<ApiRepo> for RepoDescriptor {
    fn from(repo: ApiRepo) -> Self {
        RepoDescriptor {
            owner: repo.owner.login,
            name: repo.name,
            clone_url: repo.clone_url,
        }
    }
}

/// Minimal GitHub REST collaborator: authenticated-user lookup, repository
/// listing, and the per-repository "has commits by this author" check.
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, API_BASE)
    }

    /// Used by tests to point the client at a mock server.
    pub fn with_base_url(token: &str, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| LocmapError::Api("token contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("locmap"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http, base_url: base_url.into() })
    }

    pub async fn authenticated_user(&self) -> Result<Profile> {
        let url = format!("{}/user", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LocmapError::Api(format!("GET /user returned {}", response.status())));
        }
        Ok(response.json().await?)
    }

    pub async fn get_repo(&self, owner: &str, name: &str) -> Result<RepoDescriptor> {
        let url = format!("{}/repos/{owner}/{name}", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LocmapError::Api(format!(
                "GET /repos/{owner}/{name} returned {}",
                response.status()
            )));
        }
        let repo: ApiRepo = response.json().await?;
        Ok(repo.into())
    }

    /// All repositories visible to the authenticated user.
    pub async fn list_repos(&self) -> Result<Vec<RepoDescriptor>> {
        let mut repos = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!(
                "{}/user/repos?per_page={PER_PAGE}&page={page}",
                self.base_url
            );
            let response = self.http.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(LocmapError::Api(format!(
                    "GET /user/repos page {page} returned {}",
                    response.status()
                )));
            }
            let batch: Vec<ApiRepo> = response.json().await?;
            let len = batch.len();
            repos.extend(batch.into_iter().map(RepoDescriptor::from));
            debug!(page, fetched = len, "listed repository page");
            if len < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(repos)
    }

    /// Whether `login` authored at least one commit in `repo`. Empty
    /// repositories report 409, which counts as "no commits".
    pub async fn has_commits_by(&self, repo: &RepoDescriptor, login: &str) -> Result<bool> {
        let url = format!(
            "{}/repos/{}/{}/commits?author={login}&per_page=1",
            self.base_url, repo.owner, repo.name
        );
        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::CONFLICT {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(LocmapError::Api(format!(
                "GET /repos/{}/commits returned {}",
                repo.full_name(),
                response.status()
            )));
        }
        let commits: Vec<serde_json::Value> = response.json().await?;
        Ok(!commits.is_empty())
    }
}
