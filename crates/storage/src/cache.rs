//! The [`IssueCache`] seam and its PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info};

use issuescan_core::{CachedRepository, NewIssue};

use crate::error::StorageError;

/// Persistence operations a scan needs.
#[async_trait]
pub trait IssueCache: Send + Sync {
    /// Look up a previously cached repository.
    async fn find_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<CachedRepository>, StorageError>;

    /// Create the repository row and all of its issues in one transaction.
    async fn create_repository_with_issues(
        &self,
        owner: &str,
        name: &str,
        issues: Vec<NewIssue>,
    ) -> Result<CachedRepository, StorageError>;
}

#[derive(sqlx::FromRow)]
struct RepositoryRow {
    id: i64,
    owner: String,
    name: String,
    created_at: DateTime<Utc>,
    issue_count: i64,
}

impl From<RepositoryRow> for CachedRepository {
    fn from(row: RepositoryRow) -> Self {
        Self {
            id: row.id,
            owner: row.owner,
            name: row.name,
            issue_count: row.issue_count.max(0) as usize,
            created_at: row.created_at,
        }
    }
}

/// [`IssueCache`] over the `repositories` / `issues` tables.
#[derive(Clone)]
pub struct PgIssueCache {
    pool: PgPool,
}

impl PgIssueCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IssueCache for PgIssueCache {
    async fn find_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<CachedRepository>, StorageError> {
        let row = sqlx::query_as::<_, RepositoryRow>(
            "SELECT r.id, r.owner, r.name, r.created_at,
                    (SELECT COUNT(*) FROM issues i WHERE i.repository_id = r.id) AS issue_count
             FROM repositories r
             WHERE r.owner = $1 AND r.name = $2",
        )
        .bind(owner)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CachedRepository::from))
    }

    async fn create_repository_with_issues(
        &self,
        owner: &str,
        name: &str,
        issues: Vec<NewIssue>,
    ) -> Result<CachedRepository, StorageError> {
        let mut github_ids = Vec::with_capacity(issues.len());
        let mut titles = Vec::with_capacity(issues.len());
        let mut bodies = Vec::with_capacity(issues.len());
        let mut urls = Vec::with_capacity(issues.len());
        let mut created = Vec::with_capacity(issues.len());
        for issue in issues {
            github_ids.push(issue.github_id);
            titles.push(issue.title);
            bodies.push(issue.body);
            urls.push(issue.url);
            created.push(issue.issue_created_at);
        }

        let mut tx = self.pool.begin().await?;

        let (repo_id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO repositories (owner, name) VALUES ($1, $2)
             RETURNING id, created_at",
        )
        .bind(owner)
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| log_db_error(e, owner, name))?;

        let inserted = sqlx::query(
            "INSERT INTO issues (repository_id, github_id, title, body, url, issue_created_at)
             SELECT $1, * FROM UNNEST($2::bigint[], $3::text[], $4::text[], $5::text[], $6::timestamptz[])",
        )
        .bind(repo_id)
        .bind(&github_ids)
        .bind(&titles)
        .bind(&bodies)
        .bind(&urls)
        .bind(&created)
        .execute(&mut *tx)
        .await
        .map_err(|e| log_db_error(e, owner, name))?
        .rows_affected();

        tx.commit().await?;

        info!(
            repo = %format!("{}/{}", owner, name),
            issues = inserted,
            "cached repository issues"
        );

        Ok(CachedRepository {
            id: repo_id,
            owner: owner.to_string(),
            name: name.to_string(),
            issue_count: inserted as usize,
            created_at,
        })
    }
}

fn log_db_error(e: sqlx::Error, owner: &str, name: &str) -> StorageError {
    let err = StorageError::from(e);
    error!(
        repo = %format!("{}/{}", owner, name),
        code = err.code().unwrap_or("-"),
        "issue cache write failed: {}",
        err
    );
    err
}
