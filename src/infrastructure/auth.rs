use crate::domain::auth::{AccessTokenRequest, AuthService, Claims, IssuedAccessToken, TokenError};
use crate::infrastructure::config::AuthSettings;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// JWT Authentication Service using HS256 with a single shared secret
pub struct JwtAuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    default_ttl_minutes: i64,
}

impl JwtAuthService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self::from_secret(
            settings.jwt_secret.as_bytes(),
            &settings.issuer,
            &settings.audience,
            settings.default_ttl_minutes,
        )
    }

    pub fn from_secret(
        secret: &[u8],
        issuer: &str,
        audience: &str,
        default_ttl_minutes: i64,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            default_ttl_minutes,
        }
    }
}

impl AuthService for JwtAuthService {
    fn issue_access_token(
        &self,
        request: &AccessTokenRequest,
    ) -> Result<IssuedAccessToken, TokenError> {
        let ttl_minutes = request.ttl_minutes().unwrap_or(self.default_ttl_minutes);
        let issued_at = OffsetDateTime::now_utc();
        let expires_at = ttl_minutes
            .checked_mul(60)
            .map(Duration::seconds)
            .and_then(|ttl| issued_at.checked_add(ttl))
            .ok_or_else(|| {
                TokenError::InvalidArgument(format!(
                    "Token TTL of {} minutes is out of range",
                    ttl_minutes
                ))
            })?;
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: request.user_id().to_string(),
            name: request.username().to_string(),
            email: request.email().to_string(),
            role: request.role(),
            jti: jti.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
            custom: request
                .custom_claims()
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(IssuedAccessToken {
            token,
            jti,
            issued_at,
            expires_at,
        })
    }

    fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(TokenError::Jwt)?;

        Ok(token_data.claims)
    }
}
