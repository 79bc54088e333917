use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use reqwest::{RequestBuilder, Response};
use tracing::{debug, warn};

use issuescan_core::config::GithubConfig;

use crate::error::{GithubError, RateLimit};
use crate::pagination::parse_next_page;
use crate::source::IssueSource;
use crate::types::{IssueEntry, IssuePage, RepositoryInfo};

const API_VERSION: &str = "2022-11-28";

/// Thin reqwest wrapper over the GitHub REST API.
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self, GithubError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        if config.token.is_none() {
            warn!("GITHUB_REST_TOKEN not set, using unauthenticated rate limits");
        }

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("GitHub request to {}", url);

        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Send and turn any non-2xx status into [`GithubError::Api`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, GithubError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_limit = RateLimit::from_headers(response.headers());
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["message"].as_str().map(str::to_string))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("GitHub API error")
                    .to_string()
            });

        Err(GithubError::Api {
            status: status.as_u16(),
            message,
            rate_limit,
        })
    }
}

#[async_trait]
impl IssueSource for GithubClient {
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryInfo, GithubError> {
        let response = self
            .send(self.get(&format!("/repos/{}/{}", owner, name)))
            .await?;
        let repo: RepositoryInfo = response.json().await?;
        Ok(repo)
    }

    async fn list_issues_page(
        &self,
        owner: &str,
        name: &str,
        page: u32,
        per_page: u8,
    ) -> Result<IssuePage, GithubError> {
        let request = self
            .get(&format!("/repos/{}/{}/issues", owner, name))
            .query(&[
                ("state", "open".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ]);

        let response = self.send(request).await?;
        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_page);

        let entries: Vec<IssueEntry> = response.json().await?;
        Ok(IssuePage { entries, next_page })
    }
}
