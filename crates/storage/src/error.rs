use thiserror::Error;

/// Postgres SQLSTATE for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Storage faults, split by whether the database gave us a
/// machine-readable error code.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{message}")]
    Known { code: String, message: String },

    #[error("{0}")]
    Unknown(String),
}

impl StorageError {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Known { code, .. } => Some(code),
            Self::Unknown(_) => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if let Some(code) = db_err.code() {
                return Self::Known {
                    code: code.into_owned(),
                    message: db_err.message().to_string(),
                };
            }
        }
        Self::Unknown(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Unknown(format!("migration failed: {}", e))
    }
}
