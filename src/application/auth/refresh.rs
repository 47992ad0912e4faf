use crate::application::auth::token_utils::{
    TokenResponse, access_token_request, new_refresh_token, token_response,
};
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::users::UserRepository;
use crate::infrastructure::config::AuthSettings;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// The only message a rejected refresh token ever produces
pub const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token";

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RefreshTokenRequest {
    #[serde(alias = "refreshToken")]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

pub type RefreshTokenResponse = TokenResponse;

fn invalid_refresh_token() -> AppError {
    AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
}

/// Exchanges a valid refresh token for a new access/refresh pair,
/// revoking the presented token in the same atomic step.
pub struct RefreshTokenUseCase {
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    auth_service: Arc<dyn AuthService>,
    settings: Arc<AuthSettings>,
}

impl RefreshTokenUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        auth_service: Arc<dyn AuthService>,
        settings: Arc<AuthSettings>,
    ) -> Self {
        Self {
            user_repo,
            refresh_token_repo,
            auth_service,
            settings,
        }
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn execute(
        &self,
        req: RefreshTokenRequest,
    ) -> Result<RefreshTokenResponse, AppError> {
        if req.refresh_token.trim().is_empty() {
            return Err(AppError::invalid(
                "refresh_token",
                "Refresh token is required",
            ));
        }

        // Missing, expired and revoked all collapse into one response
        let current = match self
            .refresh_token_repo
            .find_by_value(&req.refresh_token)
            .await?
        {
            Some(token) if token.is_valid() => token,
            Some(token) => {
                tracing::warn!(
                    token_id = %token.id,
                    revoked = token.revoked,
                    "Rejected refresh token that is no longer valid"
                );
                return Err(invalid_refresh_token());
            }
            None => {
                tracing::warn!("Rejected unknown refresh token");
                return Err(invalid_refresh_token());
            }
        };

        let user = self
            .user_repo
            .find_by_id(current.user_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(
                    token_id = %current.id,
                    user_id = %current.user_id,
                    "Refresh token owner does not exist"
                );
                AppError::NotFound("User not found".to_string())
            })?;

        let request = access_token_request(&user, self.settings.access_token_ttl_minutes)?;
        let access = self.auth_service.issue_access_token(&request)?;

        let (secret, replacement) =
            new_refresh_token(user.id, self.settings.refresh_token_lifetime_days)?;

        // Nothing issued above leaves this function unless the swap commits
        let rotated = self
            .refresh_token_repo
            .rotate(&current, &replacement)
            .await?;

        if !rotated {
            tracing::warn!(
                token_id = %current.id,
                "Refresh token was consumed by a concurrent rotation"
            );
            return Err(invalid_refresh_token());
        }

        tracing::info!(
            user_id = %user.id,
            revoked_token_id = %current.id,
            new_token_id = %replacement.id,
            "Refresh token rotated"
        );

        Ok(token_response(access, secret, &replacement))
    }
}
