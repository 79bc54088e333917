//! GitHub REST client for the two calls a scan needs: repository metadata
//! and the paginated open-issue listing.

pub mod client;
pub mod error;
pub mod pagination;
pub mod source;
pub mod types;

pub use client::GithubClient;
pub use error::{GithubError, RateLimit};
pub use pagination::IssuePaginator;
pub use source::IssueSource;
pub use types::{IssueEntry, IssuePage, RepositoryInfo};
