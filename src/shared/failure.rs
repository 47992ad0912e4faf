//! Boundary classification of failures.
//!
//! Every error that reaches a handler boundary is reduced to one [`Outcome`].
//! Recognised error types are a closed enum and the fallback is the
//! exhaustive last arm of a `match`, so adding a category can never shadow
//! an existing one.

use crate::domain::auth::TokenError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error as StdError;
use validator::ValidationErrors;

use super::error::{ErrorResponse, JsonApiError, JsonApiErrorSource};

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// What a caller is allowed to learn about a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Invalid { field: String, message: String },
    Unauthorized(String),
    NotFound(String),
    Error(String),
}

impl Outcome {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn generic() -> Self {
        Outcome::Error(GENERIC_ERROR_MESSAGE.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Outcome::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Outcome::NotFound(_) => StatusCode::NOT_FOUND,
            Outcome::Error(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Outcome::Invalid { .. } => "Invalid",
            Outcome::Unauthorized(_) => "Unauthorized",
            Outcome::NotFound(_) => "Not Found",
            Outcome::Error(_) => "Error",
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status();
        let title = self.title().to_string();

        let (detail, source) = match self {
            Outcome::Invalid { field, message } => (
                message,
                Some(JsonApiErrorSource {
                    pointer: None,
                    parameter: Some(field),
                }),
            ),
            Outcome::Unauthorized(message)
            | Outcome::NotFound(message)
            | Outcome::Error(message) => (message, None),
        };

        let body = ErrorResponse {
            errors: vec![JsonApiError {
                status: status.as_u16().to_string(),
                title,
                detail,
                source,
            }],
        };

        (status, Json(body)).into_response()
    }
}

/// Closed set of failure categories recognised at the boundary
#[derive(Debug)]
pub enum FailureKind<'a> {
    Validation(&'a ValidationErrors),
    Token(&'a TokenError),
    Jwt(&'a jsonwebtoken::errors::Error),
    Database(&'a sqlx::Error),
    Json(&'a serde_json::Error),
    Unclassified,
}

impl<'a> FailureKind<'a> {
    /// Walks the source chain outermost first; the first recognised cause decides.
    pub fn of(err: &'a (dyn StdError + 'static)) -> Self {
        let mut current = Some(err);

        while let Some(cause) = current {
            if let Some(e) = cause.downcast_ref::<ValidationErrors>() {
                return FailureKind::Validation(e);
            }
            if let Some(e) = cause.downcast_ref::<TokenError>() {
                return FailureKind::Token(e);
            }
            if let Some(e) = cause.downcast_ref::<jsonwebtoken::errors::Error>() {
                return FailureKind::Jwt(e);
            }
            if let Some(e) = cause.downcast_ref::<sqlx::Error>() {
                return FailureKind::Database(e);
            }
            if let Some(e) = cause.downcast_ref::<serde_json::Error>() {
                return FailureKind::Json(e);
            }
            current = cause.source();
        }

        FailureKind::Unclassified
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            FailureKind::Validation(errors) => first_field_error(errors),
            FailureKind::Token(TokenError::MissingField(field)) => {
                Outcome::invalid(*field, format!("{} is required", field))
            }
            FailureKind::Token(TokenError::InvalidArgument(message)) => {
                Outcome::invalid("request", message.clone())
            }
            FailureKind::Token(TokenError::Jwt(_)) | FailureKind::Jwt(_) => {
                Outcome::Unauthorized("Invalid or expired token".to_string())
            }
            FailureKind::Token(TokenError::Signing(_)) => Outcome::generic(),
            FailureKind::Database(sqlx::Error::RowNotFound) => {
                Outcome::NotFound("Resource not found".to_string())
            }
            FailureKind::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Outcome::invalid("resource", "Resource already exists")
            }
            FailureKind::Database(_) => Outcome::generic(),
            FailureKind::Json(_) => Outcome::invalid("body", "Malformed JSON payload"),
            FailureKind::Unclassified => Outcome::generic(),
        }
    }
}

pub fn classify(err: &anyhow::Error) -> Outcome {
    let inner: &(dyn StdError + Send + Sync + 'static) = err.as_ref();
    classify_error(inner)
}

pub fn classify_error(err: &(dyn StdError + 'static)) -> Outcome {
    FailureKind::of(err).outcome()
}

fn first_field_error(errors: &ValidationErrors) -> Outcome {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let field = field.to_string();
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("{} is invalid", field));
            (field, message)
        })
        .collect();
    fields.sort();

    match fields.into_iter().next() {
        Some((field, message)) => Outcome::Invalid { field, message },
        None => Outcome::invalid("body", "Invalid request"),
    }
}
