use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

use crate::middlewares::{AdminAuthMiddleware, current_admin};
use crate::models::*;
use crate::services::{AdminService, CountdownService};

fn admin_name(req: &HttpRequest) -> String {
    current_admin(req)
        .map(|a| a.username)
        .unwrap_or_else(|| "unknown".to_string())
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "访客列表", body = [VisitorSummary]),
        (status = 401, description = "未登录")
    )
)]
pub async fn list_visitors(service: web::Data<AdminService>) -> Result<HttpResponse> {
    match service.list_visitors() {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "访客标识 (IP)")),
    responses(
        (status = 200, description = "删除成功"),
        (status = 401, description = "未登录"),
        (status = 404, description = "访客不存在")
    )
)]
pub async fn delete_visitor(
    service: web::Data<AdminService>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::info!("Admin {} deleting visitor {id}", admin_name(&req));
    match service.delete_visitor(&id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(format!(
            "Visitor {id} deleted"
        )))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users/{id}/reset",
    tag = "admin",
    params(("id" = String, Path, description = "访客标识 (IP)")),
    responses(
        (status = 200, description = "重置成功", body = VisitorSummary),
        (status = 401, description = "未登录"),
        (status = 404, description = "访客不存在")
    )
)]
pub async fn reset_visitor(
    service: web::Data<AdminService>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::info!("Admin {} resetting visitor {id}", admin_name(&req));
    match service.reset_visitor(&id).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            summary,
            format!("Visitor {id} reset"),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/rewards",
    tag = "admin",
    responses(
        (status = 200, description = "奖品配置", body = [Prize]),
        (status = 401, description = "未登录")
    )
)]
pub async fn list_catalog(service: web::Data<AdminService>) -> Result<HttpResponse> {
    match service.list_catalog() {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/rewards",
    tag = "admin",
    request_body = UpdateCatalogRequest,
    responses(
        (status = 200, description = "保存成功", body = [Prize]),
        (status = 400, description = "概率总和不为 1 或剩余数量大于总数量"),
        (status = 401, description = "未登录")
    )
)]
pub async fn update_catalog(
    service: web::Data<AdminService>,
    request: web::Json<UpdateCatalogRequest>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    log::info!("Admin {} updating catalog", admin_name(&req));
    match service.update_catalog(request.into_inner().rewards).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            list,
            "Rewards updated",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/rewards/reset",
    tag = "admin",
    responses(
        (status = 200, description = "库存已重置", body = [Prize]),
        (status = 401, description = "未登录")
    )
)]
pub async fn reset_catalog_stock(
    service: web::Data<AdminService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    log::info!("Admin {} resetting catalog stock", admin_name(&req));
    match service.reset_catalog_stock().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            list,
            "Reward quantities reset",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/countdown",
    tag = "admin",
    request_body = SetCountdownRequest,
    responses(
        (status = 200, description = "倒计时已保存", body = CountdownResponse),
        (status = 400, description = "时间无效"),
        (status = 401, description = "未登录")
    )
)]
pub async fn set_countdown(
    service: web::Data<CountdownService>,
    request: web::Json<SetCountdownRequest>,
) -> Result<HttpResponse> {
    match service.set_countdown(request.end_time).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            data,
            "Countdown saved",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "统计数据", body = AdminStatsResponse),
        (status = 401, description = "未登录")
    )
)]
pub async fn stats(service: web::Data<AdminService>) -> Result<HttpResponse> {
    match service.stats() {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 管理后台路由，整个 scope 需要管理员会话
pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(AdminAuthMiddleware)
            .route("/users", web::get().to(list_visitors))
            .route("/users/{id}", web::delete().to(delete_visitor))
            .route("/users/{id}/reset", web::post().to(reset_visitor))
            // 旧版管理页面使用单数路径
            .route("/user/{id}", web::delete().to(delete_visitor))
            .route("/user/{id}/reset", web::post().to(reset_visitor))
            .route("/rewards", web::get().to(list_catalog))
            .route("/rewards", web::put().to(update_catalog))
            .route("/rewards/reset", web::post().to(reset_catalog_stock))
            .route("/countdown", web::post().to(set_countdown))
            .route("/stats", web::get().to(stats)),
    );
}
