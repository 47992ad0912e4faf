use crate::domain::auth::RefreshTokenRepository;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LogoutRequest {
    #[serde(alias = "refreshToken")]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Ends a session by revoking its refresh token. Succeeds whether or not the
/// token existed so the response carries no signal about it.
pub struct LogoutUseCase {
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
}

impl LogoutUseCase {
    pub fn new(refresh_token_repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { refresh_token_repo }
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn execute(&self, req: LogoutRequest) -> Result<(), AppError> {
        if req.refresh_token.trim().is_empty() {
            return Err(AppError::invalid(
                "refresh_token",
                "Refresh token is required",
            ));
        }

        let Some(token) = self
            .refresh_token_repo
            .find_by_value(&req.refresh_token)
            .await?
        else {
            return Ok(());
        };

        if self.refresh_token_repo.revoke(&token).await? {
            tracing::info!(token_id = %token.id, user_id = %token.user_id, "Refresh token revoked");
        }

        Ok(())
    }
}
