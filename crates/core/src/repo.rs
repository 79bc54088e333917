//! Repository coordinates (`owner/name`) and their validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RepoNameError;

/// A validated `owner/name` pair.
///
/// Owner: one or more of `[A-Za-z0-9_-]`. Name: one or more of
/// `[A-Za-z0-9_.-]`. Exactly one `/` separates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoName {
    owner: String,
    name: String,
}

impl RepoName {
    pub fn parse(full_name: &str) -> Result<Self, RepoNameError> {
        let trimmed = full_name.trim();
        if trimmed.is_empty() {
            return Err(RepoNameError::Empty);
        }

        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| RepoNameError::Format(trimmed.to_string()))?;

        let owner_ok = !owner.is_empty() && owner.chars().all(is_owner_char);
        let name_ok = !name.is_empty() && name.chars().all(is_name_char);
        if !owner_ok || !name_ok {
            return Err(RepoNameError::Format(trimmed.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

fn is_owner_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_name_char(c: char) -> bool {
    is_owner_char(c) || c == '.'
}

impl FromStr for RepoName {
    type Err = RepoNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RepoName {
    type Error = RepoNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RepoName> for String {
    fn from(repo: RepoName) -> Self {
        repo.full_name()
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
