use crate::domain::auth::{RefreshToken, RefreshTokenRepository, hash_token};
use crate::domain::users::{NewUser, User, UserRepository};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, anyhow::Error> {
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            role: new_user.role,
            password_hash: new_user.password_hash,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

/// In-memory token store. The mutex gives `rotate` the same
/// check-and-swap semantics the Postgres transaction provides.
#[derive(Clone, Default)]
pub struct MockRefreshTokenRepository {
    tokens: Arc<Mutex<Vec<RefreshToken>>>,
}

impl MockRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, token: RefreshToken) -> Self {
        self.tokens.lock().unwrap().push(token);
        self
    }

    /// Snapshot of every stored row
    pub fn all(&self) -> Vec<RefreshToken> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn create(&self, token: &RefreshToken) -> Result<()> {
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.iter().any(|t| t.token_hash == token.token_hash) {
            anyhow::bail!("duplicate refresh token hash");
        }
        tokens.push(token.clone());
        Ok(())
    }

    async fn find_by_value(&self, token_value: &str) -> Result<Option<RefreshToken>> {
        let hash = hash_token(token_value);
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token_hash == hash).cloned())
    }

    async fn rotate(&self, current: &RefreshToken, replacement: &RefreshToken) -> Result<bool> {
        let mut tokens = self.tokens.lock().unwrap();

        if tokens.iter().any(|t| t.token_hash == replacement.token_hash) {
            anyhow::bail!("duplicate refresh token hash");
        }

        let now = replacement.issued_at;
        let Some(stored) = tokens.iter_mut().find(|t| t.id == current.id) else {
            return Ok(false);
        };
        if !stored.is_valid_at(now) {
            return Ok(false);
        }
        stored.revoke_at(now);

        tokens.push(replacement.clone());
        Ok(true)
    }

    async fn revoke(&self, token: &RefreshToken) -> Result<bool> {
        let mut tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter_mut()
            .find(|t| t.id == token.id)
            .map(|stored| stored.revoke())
            .unwrap_or(false))
    }
}
