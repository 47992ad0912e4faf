use anyhow::{Context, Result};
use std::env;

const MIN_SECRET_BYTES: usize = 32;
/// One day
const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;
/// Ten years
const MAX_REFRESH_TOKEN_LIFETIME_DAYS: i64 = 3650;

/// Everything the process reads from its environment, loaded once in `main`
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub auth: AuthSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseSettings::from_lookup(&lookup)?,
            server: ServerSettings::from_lookup(&lookup)?,
            auth: AuthSettings::from_lookup(&lookup)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 20)?,
            min_connections: parsed(&lookup, "DB_MIN_CONNECTIONS", 5)?,
            acquire_timeout_secs: parsed(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?,
            idle_timeout_secs: parsed(&lookup, "DB_IDLE_TIMEOUT_SECS", 600)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub rate_limit_per_minute: u64,
    /// Comma separated; empty or `*` allows any origin
    pub cors_allowed_origins: String,
}

impl ServerSettings {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rate_limit_per_minute: u64 = parsed(&lookup, "RATE_LIMIT_PER_MINUTE", 60)?;
        if rate_limit_per_minute == 0 {
            anyhow::bail!("RATE_LIMIT_PER_MINUTE must be greater than zero");
        }

        Ok(Self {
            port: parsed(&lookup, "PORT", 3000)?,
            rate_limit_per_minute,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
        })
    }
}

/// Token settings read once at startup and shared read-only afterwards
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// HMAC signing secret
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    /// TTL used when a token request carries no override
    pub default_ttl_minutes: i64,
    /// TTL for tokens minted by login and rotation
    pub access_token_ttl_minutes: i64,
    pub refresh_token_lifetime_days: i64,
}

impl AuthSettings {
    /// Build settings from any key lookup, so tests need not touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.len() < MIN_SECRET_BYTES {
            anyhow::bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_BYTES);
        }

        let settings = Self {
            jwt_secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "liftlog".to_string()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "liftlog-api".to_string()),
            default_ttl_minutes: bounded(
                &lookup,
                "JWT_DEFAULT_TTL_MINUTES",
                15,
                MAX_ACCESS_TOKEN_TTL_MINUTES,
            )?,
            access_token_ttl_minutes: bounded(
                &lookup,
                "JWT_ACCESS_TOKEN_TTL_MINUTES",
                15,
                MAX_ACCESS_TOKEN_TTL_MINUTES,
            )?,
            refresh_token_lifetime_days: bounded(
                &lookup,
                "REFRESH_TOKEN_LIFETIME_DAYS",
                7,
                MAX_REFRESH_TOKEN_LIFETIME_DAYS,
            )?,
        };

        Ok(settings)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

fn bounded<F>(lookup: &F, key: &str, default: i64, max: i64) -> Result<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parsed(lookup, key, default)?;

    if value <= 0 {
        anyhow::bail!("{} must be greater than zero, got {}", key, value);
    }
    if value > max {
        anyhow::bail!("{} must be at most {}, got {}", key, max, value);
    }

    Ok(value)
}
