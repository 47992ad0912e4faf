use crate::domain::auth::TokenError;
use crate::shared::failure::{self, Outcome};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// JSON:API error document
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub errors: Vec<JsonApiError>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JsonApiError {
    pub status: String,
    pub title: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<JsonApiErrorSource>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JsonApiErrorSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid {field}: {message}")]
    Invalid { field: String, message: String },
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Expected failures carry their outcome; everything else is classified
    pub fn outcome(&self) -> Outcome {
        match self {
            AppError::Invalid { field, message } => Outcome::invalid(field.clone(), message.clone()),
            AppError::Unauthorized(message) => Outcome::Unauthorized(message.clone()),
            AppError::NotFound(message) => Outcome::NotFound(message.clone()),
            AppError::ValidationError(e) => failure::classify_error(e),
            AppError::Token(e) => failure::classify_error(e),
            AppError::DatabaseError(e) => failure::classify_error(e),
            AppError::InternalServerError(e) => failure::classify(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let outcome = self.outcome();

        if let Outcome::Error(_) = outcome {
            tracing::error!("Internal server error: {:?}", self);
        }

        outcome.into_response()
    }
}
