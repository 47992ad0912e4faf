use crate::domain::users::{Role, User};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Claim names owned by the issuer; custom claims may not shadow them
pub const REGISTERED_CLAIMS: [&str; 10] = [
    "sub", "name", "email", "role", "jti", "iss", "aud", "iat", "exp", "nbf",
];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("Invalid token: {0}")]
    Jwt(#[source] jsonwebtoken::errors::Error),
}

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Unique per-issuance identifier
    pub jti: String,
    pub iss: String,
    pub aud: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Caller-supplied claims, serialized at the top level of the payload
    #[serde(flatten)]
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow::anyhow!("Invalid user ID in claims: {}", e))
    }
}

/// Unvalidated inputs for an access token. Every field is optional here;
/// turning a draft into an [`AccessTokenRequest`] is the only validation step.
#[derive(Debug, Clone, Default)]
pub struct AccessTokenDraft {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    /// Overrides the configured default TTL, in minutes
    pub ttl_minutes: Option<i64>,
    /// Additional (type, value) claims
    pub custom_claims: Vec<(String, String)>,
}

impl From<&User> for AccessTokenDraft {
    fn from(user: &User) -> Self {
        Self {
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
            role: Some(user.role),
            ..Default::default()
        }
    }
}

/// A fully specified identity ready to be signed
#[derive(Debug, Clone, PartialEq)]
pub struct AccessTokenRequest {
    user_id: Uuid,
    username: String,
    email: String,
    role: Role,
    ttl_minutes: Option<i64>,
    custom_claims: BTreeMap<String, String>,
}

impl TryFrom<AccessTokenDraft> for AccessTokenRequest {
    type Error = TokenError;

    fn try_from(draft: AccessTokenDraft) -> Result<Self, Self::Error> {
        let user_id = draft.user_id.ok_or(TokenError::MissingField("UserId"))?;
        let username = non_blank(draft.username).ok_or(TokenError::MissingField("Username"))?;
        let email = non_blank(draft.email).ok_or(TokenError::MissingField("Email"))?;
        let role = draft.role.ok_or(TokenError::MissingField("Role"))?;

        if let Some(minutes) = draft.ttl_minutes {
            if minutes <= 0 {
                return Err(TokenError::InvalidArgument(format!(
                    "Token TTL must be positive, got {} minutes",
                    minutes
                )));
            }
        }

        let mut custom_claims = BTreeMap::new();
        for (claim_type, value) in draft.custom_claims {
            if claim_type.trim().is_empty() {
                return Err(TokenError::InvalidArgument(
                    "Custom claim type must not be empty".to_string(),
                ));
            }
            if REGISTERED_CLAIMS.contains(&claim_type.as_str()) {
                return Err(TokenError::InvalidArgument(format!(
                    "Custom claim '{}' collides with a registered claim",
                    claim_type
                )));
            }
            if custom_claims.insert(claim_type.clone(), value).is_some() {
                return Err(TokenError::InvalidArgument(format!(
                    "Duplicate custom claim '{}'",
                    claim_type
                )));
            }
        }

        Ok(Self {
            user_id,
            username,
            email,
            role,
            ttl_minutes: draft.ttl_minutes,
            custom_claims,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AccessTokenRequest {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn ttl_minutes(&self) -> Option<i64> {
        self.ttl_minutes
    }

    pub fn custom_claims(&self) -> &BTreeMap<String, String> {
        &self.custom_claims
    }
}

/// A signed access token together with the metadata callers report back
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub jti: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Generate SHA-256 hash of a token string
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Refresh token entity. Only the hash of the secret is held; the raw value
/// exists solely in the response that hands it to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub revoked: bool,
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    pub fn new(
        user_id: Uuid,
        token_value: &str,
        expires_at: OffsetDateTime,
    ) -> Result<Self, TokenError> {
        Self::new_at(user_id, token_value, expires_at, OffsetDateTime::now_utc())
    }

    pub fn new_at(
        user_id: Uuid,
        token_value: &str,
        expires_at: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<Self, TokenError> {
        if token_value.is_empty() {
            return Err(TokenError::InvalidArgument(
                "Refresh token value must not be empty".to_string(),
            ));
        }
        if expires_at <= now {
            return Err(TokenError::InvalidArgument(
                "Refresh token expiry must be in the future".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash_token(token_value),
            issued_at: now,
            expires_at,
            revoked: false,
            revoked_at: None,
        })
    }

    /// Returns `true` only on the transition; later calls change nothing.
    pub fn revoke(&mut self) -> bool {
        self.revoke_at(OffsetDateTime::now_utc())
    }

    pub fn revoke_at(&mut self, now: OffsetDateTime) -> bool {
        if self.revoked {
            return false;
        }
        self.revoked = true;
        self.revoked_at = Some(now);
        true
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(OffsetDateTime::now_utc())
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }
}

/// Repository trait for refresh tokens. Rows are never deleted.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new refresh token
    async fn create(&self, token: &RefreshToken) -> Result<()>;

    /// Find a refresh token by the raw value the client presented
    async fn find_by_value(&self, token_value: &str) -> Result<Option<RefreshToken>>;

    /// Revoke `current` and insert `replacement` as one atomic unit.
    ///
    /// The revoke only applies while `current` is still unrevoked. Returns
    /// `false`, with nothing persisted, when another caller got there first.
    async fn rotate(&self, current: &RefreshToken, replacement: &RefreshToken) -> Result<bool>;

    /// Revoke a token if it is not revoked yet. Returns whether this call did it.
    async fn revoke(&self, token: &RefreshToken) -> Result<bool>;
}

/// Signs and validates access tokens
pub trait AuthService: Send + Sync {
    fn issue_access_token(
        &self,
        request: &AccessTokenRequest,
    ) -> Result<IssuedAccessToken, TokenError>;

    fn validate_token(&self, token: &str) -> Result<Claims, TokenError>;
}
