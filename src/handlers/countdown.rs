use crate::models::*;
use crate::services::CountdownService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/countdown",
    tag = "countdown",
    responses(
        (status = 200, description = "获取倒计时成功", body = CountdownResponse)
    )
)]
pub async fn get_countdown(service: web::Data<CountdownService>) -> Result<HttpResponse> {
    match service.get_countdown() {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn countdown_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/countdown", web::get().to(get_countdown));
}
