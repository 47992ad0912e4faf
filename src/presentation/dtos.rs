use crate::application::auth::token_utils::TokenResponse;
use crate::domain::auth::Claims;
use crate::domain::users::Role;
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Attributes of the `auth-tokens` resource
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenResource {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub access_token_expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub refresh_token_expires_at: OffsetDateTime,
}

impl From<TokenResponse> for AuthTokenResource {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            access_token_expires_at: response.access_token_expires_at,
            refresh_token_expires_at: response.refresh_token_expires_at,
        }
    }
}

/// Attributes of the `current-user` resource, read straight from the access token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResource {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub token_id: String,
    /// Unix timestamp at which the access token expires
    pub expires_at: i64,
}

impl From<&Claims> for CurrentUserResource {
    fn from(claims: &Claims) -> Self {
        Self {
            username: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role,
            token_id: claims.jti.clone(),
            expires_at: claims.exp,
        }
    }
}
