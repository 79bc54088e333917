use thiserror::Error;

/// Why an `owner/name` string was rejected. Both variants render the
/// same user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoNameError {
    /// Carries the rejected input.
    #[error("Invalid repository name format. Use 'owner/repo' format.")]
    Format(String),

    #[error("Invalid repository name format. Use 'owner/repo' format.")]
    Empty,
}
