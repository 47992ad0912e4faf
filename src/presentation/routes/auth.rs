use crate::infrastructure::state::AppState;
use crate::presentation::handlers::auth;
use crate::presentation::middleware::rate_limit::AuthRateLimitLayer;
use axum::{
    Router,
    routing::{get, post},
};

/// Auth routes. Credential-bearing endpoints sit behind the rate limiter.
pub fn routes(rate_limit: AuthRateLimitLayer) -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh_token))
        .route("/logout", post(auth::logout))
        .layer(rate_limit);

    Router::new().route("/me", get(auth::me)).merge(limited)
}
