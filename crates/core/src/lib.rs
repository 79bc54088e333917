pub mod config;
pub mod error;
pub mod issue;
pub mod repo;

pub use config::Config;
pub use error::*;
pub use issue::*;
pub use repo::RepoName;
