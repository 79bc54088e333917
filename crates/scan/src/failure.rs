//! Faults a scan can hit and the message each one leaves on the job.

use chrono::SecondsFormat;
use thiserror::Error;

use issuescan_github::GithubError;
use issuescan_storage::StorageError;

const API_FALLBACK: &str = "An error occurred while fetching data from GitHub";
const NETWORK_MESSAGE: &str = "Network error: Unable to connect to GitHub API";
const UNEXPECTED: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ScanError {
    /// Metadata lookup returned 404.
    #[error("Repository not found: {0} does not exist or is not accessible")]
    RepositoryNotFound(String),

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ScanError {
    /// Human-readable text stored in `result.error` of a failed job.
    pub fn failure_message(&self) -> String {
        match self {
            Self::RepositoryNotFound(_) => self.to_string(),
            Self::Github(e) => github_message(e),
            Self::Storage(StorageError::Known { code, message }) => {
                format!("Database error [{}]: {}", code, message)
            }
            Self::Storage(StorageError::Unknown(message)) => {
                format!("Database error: {}", message)
            }
        }
    }
}

fn github_message(err: &GithubError) -> String {
    if err.is_rate_limited() {
        return match err.rate_limit_reset() {
            Some(reset) => format!(
                "GitHub API rate limit exceeded. Reset at {}",
                reset.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            None => "GitHub API rate limit exceeded".to_string(),
        };
    }

    match err {
        GithubError::Api { message, .. } if message.trim().is_empty() => API_FALLBACK.to_string(),
        GithubError::Api { message, .. } => message.clone(),
        GithubError::Network(_) => NETWORK_MESSAGE.to_string(),
        other => {
            let text = other.to_string();
            if text.trim().is_empty() {
                UNEXPECTED.to_string()
            } else {
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issuescan_github::RateLimit;

    fn api(status: u16, message: &str, remaining: Option<u32>) -> ScanError {
        ScanError::Github(GithubError::Api {
            status,
            message: message.to_string(),
            rate_limit: RateLimit {
                limit: Some(60),
                remaining,
                reset: Some(1_700_000_000),
            },
        })
    }

    #[test]
    fn test_not_found_message() {
        let err = ScanError::RepositoryNotFound("nobody/nothing".to_string());
        assert_eq!(
            err.failure_message(),
            "Repository not found: nobody/nothing does not exist or is not accessible"
        );
    }

    #[test]
    fn test_rate_limit_message() {
        let err = api(403, "API rate limit exceeded for 10.0.0.1.", Some(0));
        assert_eq!(
            err.failure_message(),
            "GitHub API rate limit exceeded. Reset at 2023-11-14T22:13:20Z"
        );
    }

    #[test]
    fn test_forbidden_with_quota_uses_api_message() {
        let err = api(403, "Resource not accessible by integration", Some(10));
        assert_eq!(err.failure_message(), "Resource not accessible by integration");
    }

    #[test]
    fn test_api_message_fallback() {
        let err = api(500, "", Some(10));
        assert_eq!(err.failure_message(), API_FALLBACK);
    }

    #[test]
    fn test_network_message() {
        let err = ScanError::from(GithubError::Network("connection refused".to_string()));
        assert_eq!(err.failure_message(), NETWORK_MESSAGE);
    }

    #[test]
    fn test_parse_error_keeps_own_message() {
        let err = ScanError::from(GithubError::Parse("expected value at line 1".to_string()));
        assert_eq!(err.failure_message(), "failed to parse response: expected value at line 1");
    }

    #[test]
    fn test_storage_messages() {
        let known = ScanError::from(StorageError::Known {
            code: "23505".to_string(),
            message: "duplicate key value violates unique constraint".to_string(),
        });
        assert_eq!(
            known.failure_message(),
            "Database error [23505]: duplicate key value violates unique constraint"
        );

        let unknown = ScanError::from(StorageError::Unknown("pool timed out".to_string()));
        assert_eq!(unknown.failure_message(), "Database error: pool timed out");
    }
}
