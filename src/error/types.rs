// src/error/types.rs
use crate::domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// HTTP-like status carried by duplicate-name conflicts
pub const CONFLICT_STATUS: u16 = 409;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found or unauthorized")]
    NotFoundOrUnauthorized,

    #[error("A record with this {field} already exists")]
    DuplicateName { field: String, status: u16 },

    #[error("Cannot delete {entity}: {count} dependent {dependents} record(s) exist")]
    HasDependents {
        entity: String,
        dependents: String,
        count: i64,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Translate a storage error raised while writing a row whose display
    /// name lives in `name_field`.
    ///
    /// Unique-constraint violations become `DuplicateName`; anything else is
    /// passed through untouched.
    pub fn from_write(err: rusqlite::Error, name_field: &str) -> Self {
        if is_unique_violation(&err) {
            AppError::DuplicateName {
                field: name_field.to_string(),
                status: CONFLICT_STATUS,
            }
        } else {
            AppError::Database(err)
        }
    }
}

/// True when the error is a UNIQUE or PRIMARY KEY constraint failure
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

/// True when the error is a FOREIGN KEY constraint failure.
/// `ON DELETE RESTRICT` raises through a trigger, so it carries
/// SQLITE_CONSTRAINT_TRIGGER with the foreign key message.
pub fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                || (failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_TRIGGER
                    && message
                        .as_deref()
                        .is_some_and(|m| m.contains("FOREIGN KEY constraint failed")))
        }
        _ => false,
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Validation(format!("Date parse error: {}", err))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
