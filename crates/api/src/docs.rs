use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::subscriptions::subscribe,
        crate::routes::subscriptions::unsubscribe,
        crate::routes::subscriptions::update_preferences,
        crate::routes::subscriptions::stats,
        crate::routes::notifications::list_notifications,
        crate::routes::auth::login,
        crate::routes::auth::current_token
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::subscriptions::PreferencesBody,
            crate::routes::subscriptions::SubscribeRequest,
            crate::routes::subscriptions::MessageResponse,
            crate::routes::subscriptions::StatsResponse,
            crate::routes::notifications::NotificationResponse,
            crate::routes::auth::TokenForm,
            crate::routes::auth::TokenResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Subscriptions", description = "Subscribing and managing preferences"),
        (name = "Notifications", description = "Notifications delivered to the caller"),
        (name = "Auth", description = "Bearer token issuance")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("JWT".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
