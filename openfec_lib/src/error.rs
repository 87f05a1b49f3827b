//! Error types for the library layer.

use std::fmt;

use crate::db::DbError;

/// Errors surfaced to callers of the pagination and validation helpers.
///
/// Every variant maps to an HTTP-equivalent status via [`ApiError::status_code`].
#[derive(Debug)]
pub enum ApiError {
    /// A request parameter was missing or out of range.
    Validation { message: String, status_code: u16 },
    /// The request asks for a paging mode that is not implemented.
    Unsupported(String),
    /// Sort compilation or cursor parsing failed in the query layer.
    Query(openfec_query::Error),
    /// The store rejected or failed to run a query.
    Db(DbError),
}

impl ApiError {
    /// A 422 validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            status_code: 422,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { status_code, .. } => *status_code,
            Self::Unsupported(_) => 422,
            Self::Query(e) => e.status_code(),
            Self::Db(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { message, .. } => write!(f, "{}", message),
            Self::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            Self::Query(e) => write!(f, "{}", e),
            Self::Db(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Query(e) => Some(e),
            Self::Db(e) => Some(e),
            _ => None,
        }
    }
}

impl From<openfec_query::Error> for ApiError {
    fn from(e: openfec_query::Error) -> Self {
        Self::Query(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Db(e)
    }
}
