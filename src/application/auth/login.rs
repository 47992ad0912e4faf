use crate::application::auth::token_utils::{TokenResponse, issue_session};
use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::password::CredentialVerifier;
use crate::domain::users::UserRepository;
use crate::infrastructure::config::AuthSettings;
use crate::shared::error::AppError;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

pub type LoginResponse = TokenResponse;

pub struct LoginUseCase {
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    auth_service: Arc<dyn AuthService>,
    credential_verifier: Arc<dyn CredentialVerifier>,
    settings: Arc<AuthSettings>,
}

impl LoginUseCase {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        auth_service: Arc<dyn AuthService>,
        credential_verifier: Arc<dyn CredentialVerifier>,
        settings: Arc<AuthSettings>,
    ) -> Self {
        Self {
            user_repo,
            refresh_token_repo,
            auth_service,
            credential_verifier,
            settings,
        }
    }

    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn execute(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        // Unknown email and wrong password are reported identically and
        // both pay for one password verification
        let Some(user) = self.user_repo.find_by_email(&req.email).await? else {
            let _ = self
                .credential_verifier
                .verify(&req.password, self.credential_verifier.decoy_hash());
            tracing::warn!("Login rejected: unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let valid_password = self
            .credential_verifier
            .verify(&req.password, &user.password_hash)?;

        if !valid_password {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        issue_session(
            &user,
            &self.auth_service,
            &self.refresh_token_repo,
            &self.settings,
        )
        .await
    }
}
