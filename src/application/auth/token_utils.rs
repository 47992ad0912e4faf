use crate::domain::auth::{
    AccessTokenDraft, AccessTokenRequest, AuthService, IssuedAccessToken, RefreshToken,
    RefreshTokenRepository, TokenError,
};
use crate::domain::users::User;
use crate::infrastructure::config::AuthSettings;
use crate::shared::error::AppError;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Serialize;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Entropy of a refresh token secret
pub const REFRESH_TOKEN_BYTES: usize = 32;

const SECONDS_PER_DAY: i64 = 86_400;

/// Common response structure for token operations
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub access_token_expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub refresh_token_expires_at: OffsetDateTime,
}

/// Fresh refresh token secret from the OS RNG, base64url without padding
pub fn generate_refresh_secret() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn access_token_request(
    user: &User,
    ttl_minutes: i64,
) -> Result<AccessTokenRequest, TokenError> {
    AccessTokenRequest::try_from(AccessTokenDraft {
        ttl_minutes: Some(ttl_minutes),
        ..AccessTokenDraft::from(user)
    })
}

/// New refresh token entity plus the raw secret that only the client keeps
pub fn new_refresh_token(
    user_id: Uuid,
    lifetime_days: i64,
) -> Result<(String, RefreshToken), TokenError> {
    let secret = generate_refresh_secret();
    let now = OffsetDateTime::now_utc();
    let expires_at = lifetime_days
        .checked_mul(SECONDS_PER_DAY)
        .map(Duration::seconds)
        .and_then(|lifetime| now.checked_add(lifetime))
        .ok_or_else(|| {
            TokenError::InvalidArgument(format!(
                "Refresh token lifetime of {} days is out of range",
                lifetime_days
            ))
        })?;
    let token = RefreshToken::new_at(user_id, &secret, expires_at, now)?;
    Ok((secret, token))
}

pub fn token_response(
    access: IssuedAccessToken,
    refresh_secret: String,
    refresh: &RefreshToken,
) -> TokenResponse {
    TokenResponse {
        expires_in: (access.expires_at - access.issued_at).whole_seconds(),
        access_token: access.token,
        refresh_token: refresh_secret,
        token_type: "Bearer".to_string(),
        access_token_expires_at: access.expires_at,
        refresh_token_expires_at: refresh.expires_at,
    }
}

/// Issue the first access/refresh pair of a session
pub async fn issue_session(
    user: &User,
    auth_service: &Arc<dyn AuthService>,
    refresh_token_repo: &Arc<dyn RefreshTokenRepository>,
    settings: &AuthSettings,
) -> Result<TokenResponse, AppError> {
    let request = access_token_request(user, settings.access_token_ttl_minutes)?;
    let access = auth_service.issue_access_token(&request)?;

    let (secret, refresh) = new_refresh_token(user.id, settings.refresh_token_lifetime_days)?;
    refresh_token_repo.create(&refresh).await?;

    tracing::info!(user_id = %user.id, jti = %access.jti, "Session issued");

    Ok(token_response(access, secret, &refresh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::hash_token;
    use crate::domain::users::Role;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "joe".to_string(),
            email: "joe@x".to_string(),
            role: Role::Admin,
            password_hash: "hash".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_refresh_secrets_are_random_and_url_safe() {
        let first = generate_refresh_secret();
        let second = generate_refresh_secret();

        assert_ne!(first, second);
        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(first.len(), 43);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_new_refresh_token_uses_lifetime_days() {
        let user_id = Uuid::new_v4();
        let (secret, token) = new_refresh_token(user_id, 7).unwrap();

        assert_eq!(token.user_id, user_id);
        assert_eq!(token.token_hash, hash_token(&secret));
        assert_eq!(token.expires_at - token.issued_at, Duration::days(7));
        assert!(token.is_valid());
    }

    #[test]
    fn test_out_of_range_lifetime_is_invalid_argument() {
        for days in [10_000_000, i64::MAX] {
            assert!(matches!(
                new_refresh_token(Uuid::new_v4(), days),
                Err(TokenError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_access_token_request_carries_identity() {
        let user = user();
        let request = access_token_request(&user, 20).unwrap();

        assert_eq!(request.user_id(), user.id);
        assert_eq!(request.username(), "joe");
        assert_eq!(request.email(), "joe@x");
        assert_eq!(request.role(), Role::Admin);
        assert_eq!(request.ttl_minutes(), Some(20));
    }

    #[test]
    fn test_access_token_request_rejects_zero_ttl() {
        assert!(matches!(
            access_token_request(&user(), 0),
            Err(TokenError::InvalidArgument(_))
        ));
    }
}
