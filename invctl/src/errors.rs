use crate::db::errors::DbError;
use crate::types::Resource;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data: malformed body, unknown fields, or a violated validation rule
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// The request conflicts with the current state of a resource
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(resource: Resource, id: impl ToString) -> Self {
        Error::NotFound {
            resource: resource.singular().to_string(),
            id: id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest { message: message.into() }
    }

    /// Turn a store-level `NotFound` into a resource-specific one, leaving other errors alone
    pub fn from_db_for(err: DbError, resource: Resource, id: impl ToString) -> Self {
        match err {
            DbError::NotFound => Error::not_found(resource, id),
            other => Error::Database(other),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Conflict { message } => message.clone(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { .. } => "Resource already exists".to_string(),
                DbError::ForeignKeyViolation { table, .. } => match table.as_deref() {
                    Some("product_tags") => "One or more tag IDs do not reference an existing tag".to_string(),
                    Some("products") => "category_id does not reference an existing category".to_string(),
                    _ => "Invalid reference to related resource".to_string(),
                },
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(db_err) => {
                tracing::warn!("Database constraint error: {} ({:?})", self, db_err);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::bad_request(rejection.body_text())
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_renders_error_envelope() {
        let response = Error::not_found(Resource::Categories, 42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "error": "Category with ID 42 not found" }));
    }

    #[tokio::test]
    async fn persistence_failures_do_not_leak_details() {
        let err = Error::Database(DbError::Other(anyhow::anyhow!("connection refused: 10.0.0.3:5432")));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Database error occurred");
        assert!(!body.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn unknown_tag_reference_is_a_bad_request() {
        let err = Error::Database(DbError::ForeignKeyViolation {
            constraint: Some("product_tags_tag_id_fkey".to_string()),
            table: Some("product_tags".to_string()),
            message: "insert or update on table \"product_tags\" violates foreign key constraint".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "One or more tag IDs do not reference an existing tag");
    }

    #[test]
    fn from_db_for_only_rewrites_not_found() {
        let err = Error::from_db_for(DbError::NotFound, Resource::Products, 9);
        assert!(matches!(err, Error::NotFound { ref resource, ref id } if resource == "Product" && id == "9"));

        let err = Error::from_db_for(DbError::Other(anyhow::anyhow!("boom")), Resource::Products, 9);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
