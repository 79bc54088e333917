use async_trait::async_trait;

use crate::error::GithubError;
use crate::types::{IssuePage, RepositoryInfo};

/// The upstream calls a scan depends on.
///
/// [`crate::GithubClient`] is the production implementation; tests
/// substitute in-memory fakes.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetch repository metadata. A missing or invisible repository yields
    /// `GithubError::Api { status: 404, .. }`.
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryInfo, GithubError>;

    /// Fetch one page (1-based) of open issues, pull requests included.
    async fn list_issues_page(
        &self,
        owner: &str,
        name: &str,
        page: u32,
        per_page: u8,
    ) -> Result<IssuePage, GithubError>;
}
