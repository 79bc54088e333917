//! PostgreSQL-backed cache of scanned repositories and their open issues.

pub mod cache;
pub mod db;
pub mod error;

pub use cache::{IssueCache, PgIssueCache};
pub use db::connect;
pub use error::StorageError;
