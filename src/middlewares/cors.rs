use actix_cors::Cors;

/// 活动页与管理后台的跨域策略
/// - 未配置来源时放行任意来源 (活动页可能嵌在其它域名下)
/// - 管理后台依赖 cookie 会话，需携带凭据
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let origins = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            origins.is_empty()
                || origin
                    .to_str()
                    .is_ok_and(|o| origins.iter().any(|allowed| allowed == o))
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
