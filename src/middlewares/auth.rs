use crate::error::AppError;
use crate::models::AdminIdentity;
use crate::services::{AuthService, SESSION_COOKIE};
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// 管理员会话校验
///
/// 挂在 `/admin` scope 上，scope 内的每个路由都需要有效会话；
/// 路由匹配使用解码后的路径，因此编码过的路径同样经过校验。
/// AuthService 从 app_data 中获取。
pub struct AdminAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AdminAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddlewareService { service }))
    }
}

pub struct AdminAuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let Some(auth_service) = req.app_data::<web::Data<AuthService>>().cloned() else {
            let error = AppError::InternalError("AuthService is not registered".into());
            return Box::pin(async move { Err(error.into()) });
        };

        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

        let Some(token) = token else {
            let error = AppError::Unauthorized;
            return Box::pin(async move { Err(error.into()) });
        };

        match auth_service.verify(&token) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(_) => {
                let error = AppError::Unauthorized;
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// 获取当前管理员身份
pub fn current_admin(req: &actix_web::HttpRequest) -> Option<AdminIdentity> {
    req.extensions().get::<AdminIdentity>().cloned()
}
