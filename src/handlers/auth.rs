use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use crate::models::*;
use crate::services::{AuthService, SESSION_COOKIE};

fn session_cookie(token: String, ttl_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(ttl_secs))
        .finish()
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功，写入会话 cookie", body = AuthStatusResponse),
        (status = 401, description = "用户名或密码错误")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(&request) {
        Ok((token, identity)) => Ok(HttpResponse::Ok()
            .cookie(session_cookie(
                token,
                auth_service.session_ttl_secs(),
                auth_service.secure_cookie(),
            ))
            .json(ApiResponse::success_with_message(
                AuthStatusResponse {
                    authenticated: true,
                    username: Some(identity.username),
                },
                "Login successful",
            ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "登出成功")
    )
)]
pub async fn logout(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE)
        && let Err(e) = auth_service.logout(cookie.value())
    {
        return Ok(e.error_response());
    }

    let mut removal = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .secure(auth_service.secure_cookie())
        .finish();
    removal.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(ApiResponse::<()>::message("Logged out")))
}

#[utoipa::path(
    get,
    path = "/auth/status",
    tag = "auth",
    responses(
        (status = 200, description = "当前登录状态", body = AuthStatusResponse)
    )
)]
pub async fn status(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let identity = req
        .cookie(SESSION_COOKIE)
        .and_then(|c| auth_service.verify(c.value()).ok());

    Ok(HttpResponse::Ok().json(ApiResponse::success(AuthStatusResponse {
        authenticated: identity.is_some(),
        username: identity.map(|i| i.username),
    })))
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/status", web::get().to(status)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("token".into(), 60, true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(60)));

        let plain = session_cookie("token".into(), 60, false);
        assert_ne!(plain.secure(), Some(true));
    }
}
