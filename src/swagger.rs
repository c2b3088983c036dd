use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::services::SESSION_COOKIE,
                ))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::lucky_draw::get_status,
        handlers::lucky_draw::shake,
        handlers::lucky_draw::claim,
        handlers::countdown::get_countdown,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::status,
        handlers::admin::list_visitors,
        handlers::admin::delete_visitor,
        handlers::admin::reset_visitor,
        handlers::admin::list_catalog,
        handlers::admin::update_catalog,
        handlers::admin::reset_catalog_stock,
        handlers::admin::set_countdown,
        handlers::admin::stats,
    ),
    components(
        schemas(
            Prize,
            UpdateCatalogRequest,
            PrizeStockSummary,
            DrawEntry,
            VisitorState,
            VisitorStatusResponse,
            DrawResponse,
            ClaimResponse,
            VisitorSummary,
            CountdownResponse,
            SetCountdownRequest,
            LoginRequest,
            AuthStatusResponse,
            AdminStatsResponse,
            ApiError,
            ApiErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "lucky_draw", description = "Shake the tree and claim rewards"),
        (name = "countdown", description = "Game opening countdown"),
        (name = "auth", description = "Admin session API"),
        (name = "admin", description = "Visitor and reward administration API"),
    ),
    info(
        title = "Lucky Tree API",
        version = "1.0.0",
        description = "Lucky Tree promotional draw REST API documentation"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
