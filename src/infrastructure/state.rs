use crate::domain::auth::{AuthService, RefreshTokenRepository};
use crate::domain::password::CredentialVerifier;
use crate::domain::users::UserRepository;
use crate::infrastructure::auth::JwtAuthService;
use crate::infrastructure::config::AuthSettings;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::password::Argon2Verifier;
use crate::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub settings: Arc<AuthSettings>,
    pub auth_service: Arc<dyn AuthService>,
    pub credential_verifier: Arc<dyn CredentialVerifier>,
    pub user_repo: Arc<dyn UserRepository>,
    pub refresh_token_repo: Arc<dyn RefreshTokenRepository>,
}

impl AppState {
    /// Production wiring: Postgres repositories, HS256 tokens, Argon2 passwords
    pub fn new(pool: DbPool, settings: AuthSettings) -> Self {
        let auth_service = Arc::new(JwtAuthService::new(&settings));

        Self {
            user_repo: Arc::new(PostgresUserRepository::new(pool.clone())),
            refresh_token_repo: Arc::new(PostgresRefreshTokenRepository::new(pool.clone())),
            credential_verifier: Arc::new(Argon2Verifier::new()),
            auth_service,
            settings: Arc::new(settings),
            pool,
        }
    }

    pub fn with_user_repo(mut self, user_repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = user_repo;
        self
    }

    pub fn with_refresh_token_repo(
        mut self,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    ) -> Self {
        self.refresh_token_repo = refresh_token_repo;
        self
    }
}
