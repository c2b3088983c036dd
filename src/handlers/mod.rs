pub mod admin;
pub mod auth;
pub mod countdown;
pub mod lucky_draw;

pub use admin::admin_config;
pub use auth::auth_config;
pub use countdown::countdown_config;
pub use lucky_draw::lucky_draw_config;

use actix_web::web;

use crate::error::AppError;

/// 请求体解析失败统一返回 VALIDATION_ERROR
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// 所有 /api 路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(lucky_draw_config)
            .configure(countdown_config)
            .configure(auth_config)
            .configure(admin_config),
    );
}
