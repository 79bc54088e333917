//! Issue records as they are handed to and returned from the issue cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One open issue, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIssue {
    /// GitHub's numeric issue id (not the per-repo issue number).
    pub github_id: i64,
    pub title: String,
    /// Empty when the issue has no description.
    pub body: String,
    pub url: String,
    pub issue_created_at: DateTime<Utc>,
}

/// A repository that has been cached together with its issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRepository {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub issue_count: usize,
    pub created_at: DateTime<Utc>,
}
