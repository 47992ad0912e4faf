use crate::application::auth::login::{LoginRequest, LoginResponse};
use crate::application::auth::logout::LogoutRequest;
use crate::application::auth::refresh::{RefreshTokenRequest, RefreshTokenResponse};
use crate::domain::users::Role;
use crate::presentation::dtos::{AuthTokenResource, CurrentUserResource};
use crate::shared::error::{ErrorResponse, JsonApiError, JsonApiErrorSource};
use crate::shared::response::{JsonApiResource, JsonApiResponse};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Liftlog Auth API",
        version = "0.1.0",
        description = "Session management for the Liftlog fitness tracker.\n\nResponses follow the JSON:API v1.1 document structure."
    ),
    paths(
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::refresh_token,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::auth::me,
    ),
    components(
        schemas(
            Role,
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            RefreshTokenResponse,
            LogoutRequest,
            AuthTokenResource,
            CurrentUserResource,
            JsonApiResource<AuthTokenResource>,
            JsonApiResource<CurrentUserResource>,
            JsonApiResponse<JsonApiResource<AuthTokenResource>>,
            JsonApiResponse<JsonApiResource<CurrentUserResource>>,
            ErrorResponse,
            JsonApiError,
            JsonApiErrorSource,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and session endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
