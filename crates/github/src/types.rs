//! Response shapes for the GitHub endpoints the scanner calls.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use issuescan_core::NewIssue;

/// Subset of `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub open_issues_count: u64,
    pub html_url: String,
}

/// One entry of `GET /repos/{owner}/{repo}/issues`.
///
/// The listing returns pull requests as well; those carry a `pull_request`
/// object.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueEntry {
    pub id: i64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl IssueEntry {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn into_new_issue(self) -> NewIssue {
        NewIssue {
            github_id: self.id,
            title: self.title,
            body: self.body.unwrap_or_default(),
            url: self.html_url,
            issue_created_at: self.created_at,
        }
    }
}

/// A single page of the issue listing.
#[derive(Debug, Clone, Default)]
pub struct IssuePage {
    pub entries: Vec<IssueEntry>,
    /// Page number advertised by `Link: rel="next"`, if any.
    pub next_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_entry_pull_request_marker() {
        let json = r#"[
            {"id": 1, "number": 10, "title": "Crash on start", "body": null,
             "html_url": "https://github.com/acme/widgets/issues/10",
             "created_at": "2024-03-01T12:00:00Z"},
            {"id": 2, "number": 11, "title": "Fix crash", "body": "closes #10",
             "html_url": "https://github.com/acme/widgets/pull/11",
             "created_at": "2024-03-02T12:00:00Z",
             "pull_request": {"url": "https://api.github.com/repos/acme/widgets/pulls/11"}}
        ]"#;
        let entries: Vec<IssueEntry> = serde_json::from_str(json).unwrap();
        assert!(!entries[0].is_pull_request());
        assert!(entries[1].is_pull_request());
    }

    #[test]
    fn test_into_new_issue_defaults_empty_body() {
        let entry = IssueEntry {
            id: 42,
            number: 7,
            title: "Docs typo".to_string(),
            body: None,
            html_url: "https://github.com/acme/widgets/issues/7".to_string(),
            created_at: "2024-01-05T08:30:00Z".parse().unwrap(),
            pull_request: None,
        };
        let issue = entry.into_new_issue();
        assert_eq!(issue.github_id, 42);
        assert_eq!(issue.body, "");
        assert_eq!(issue.url, "https://github.com/acme/widgets/issues/7");
        assert_eq!(issue.issue_created_at.to_rfc3339(), "2024-01-05T08:30:00+00:00");
    }

    #[test]
    fn test_repository_info_ignores_extra_fields() {
        let json = r#"{"id": 9, "full_name": "acme/widgets", "html_url": "https://github.com/acme/widgets",
                       "stargazers_count": 3, "owner": {"login": "acme"}}"#;
        let repo: RepositoryInfo = serde_json::from_str(json).unwrap();
        assert_eq!(repo.full_name, "acme/widgets");
        assert!(!repo.private);
        assert_eq!(repo.open_issues_count, 0);
    }
}
