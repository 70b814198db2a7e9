// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors -> client-facing responses with an HTTP-like status
// - Never exposes storage internals
// - Logs server-side failures

use serde::{Deserialize, Serialize};

use crate::error::{AppError, CONFLICT_STATUS};

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub status: u16,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Resource not found, or not visible to the caller (404)
    NotFound,

    /// Invalid input or unknown entity (400)
    Validation,

    /// Duplicate name or dependent records (409)
    Conflict,

    /// Database/persistence error (500)
    Database,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorType {
    pub fn status(self) -> u16 {
        match self {
            ErrorType::NotFound => 404,
            ErrorType::Validation => 400,
            ErrorType::Conflict => CONFLICT_STATUS,
            ErrorType::Database | ErrorType::Internal => 500,
        }
    }
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            status: error_type.status(),
            message: message.into(),
            details,
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound => Self::new(ErrorType::NotFound, "Resource not found", None),

            AppError::NotFoundOrUnauthorized => Self::new(
                ErrorType::NotFound,
                "Record not found or unauthorized",
                None,
            ),

            AppError::UnknownEntity(name) => Self::new(
                ErrorType::Validation,
                format!("Unknown entity: {}", name),
                None,
            ),

            AppError::Validation(message) => Self::new(ErrorType::Validation, message, None),

            AppError::Domain(domain_error) => Self::new(
                ErrorType::Validation,
                "Domain validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::DuplicateName { field, status } => Self {
                status,
                ..Self::new(
                    ErrorType::Conflict,
                    format!("A record with this {} already exists", field),
                    Some(field),
                )
            },

            err @ AppError::HasDependents { .. } => {
                Self::new(ErrorType::Conflict, err.to_string(), None)
            }

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Config(config_error) => {
                log::error!("Configuration error: {}", config_error);
                Self::new(ErrorType::Internal, "Invalid configuration", None)
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::Internal,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}

/// Helper trait to convert Results to ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, ErrorResponse>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, ErrorResponse> {
        self.map_err(ErrorResponse::from_app_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = ErrorResponse::from_app_error(AppError::NotFound);
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.status, 404);
        assert_eq!(error.message, "Resource not found");
    }

    #[test]
    fn test_foreign_and_missing_records_look_alike() {
        let error = ErrorResponse::from_app_error(AppError::NotFoundOrUnauthorized);
        assert_eq!(error.status, 404);
        assert_eq!(error.message, "Record not found or unauthorized");
    }

    #[test]
    fn test_client_errors() {
        let unknown = ErrorResponse::from_app_error(AppError::UnknownEntity("planets".into()));
        assert_eq!(unknown.status, 400);

        let invalid = ErrorResponse::validation("Invalid input".to_string());
        assert_eq!(invalid.error_type, ErrorType::Validation);
        assert_eq!(invalid.message, "Invalid input");
    }

    #[test]
    fn test_conflicts() {
        let duplicate = ErrorResponse::from_app_error(AppError::DuplicateName {
            field: "stateName".into(),
            status: CONFLICT_STATUS,
        });
        assert_eq!(duplicate.error_type, ErrorType::Conflict);
        assert_eq!(duplicate.status, 409);
        assert_eq!(duplicate.details.as_deref(), Some("stateName"));

        let dependents = ErrorResponse::from_app_error(AppError::HasDependents {
            entity: "zones".into(),
            dependents: "states".into(),
            count: 2,
        });
        assert_eq!(dependents.status, 409);
        assert!(dependents.message.contains("states"));
    }

    #[test]
    fn test_database_errors_are_opaque() {
        let error = ErrorResponse::from_app_error(AppError::Database(
            rusqlite::Error::QueryReturnedNoRows,
        ));
        assert_eq!(error.status, 500);
        assert_eq!(error.message, "Database operation failed");
    }

    #[test]
    fn test_serialization() {
        let error = ErrorResponse::not_found("Zone");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("not_found"));
        assert!(json.contains("Zone not found"));
    }
}
