use crate::infrastructure::config::ServerSettings;
use crate::infrastructure::state::AppState;
use crate::presentation::handlers;
use crate::presentation::middleware::{cors, panic, rate_limit};
use crate::presentation::openapi::ApiDoc;
use crate::presentation::routes;
use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn app(state: AppState, server: &ServerSettings) -> anyhow::Result<Router> {
    let rate_limit = rate_limit::rate_limit_layer(server.rate_limit_per_minute)?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1/auth", routes::auth::routes(rate_limit))
        .layer(panic::catch_panic_layer())
        .layer(cors::cors_layer(&server.cors_allowed_origins)?)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
