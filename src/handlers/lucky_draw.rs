use crate::models::*;
use crate::services::LuckyDrawService;
use crate::utils::visitor_id;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/status",
    tag = "lucky_draw",
    responses(
        (status = 200, description = "获取访客状态成功", body = VisitorStatusResponse)
    )
)]
/// 获取访客当前状态（次数 / 抽奖记录 / 最佳奖品 / 是否已领取）
/// 未出现过的访客返回零值，不会创建记录
pub async fn get_status(
    service: web::Data<LuckyDrawService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let visitor = visitor_id(&req);
    match service.get_status(&visitor) {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/shake",
    tag = "lucky_draw",
    responses(
        (status = 200, description = "摇树成功", body = DrawResponse),
        (status = 400, description = "次数用完 / 奖品全部缺货 / 已领取")
    )
)]
/// 摇树一次:
/// 1. 检查剩余次数
/// 2. 在有库存的奖品中按概率抽取
/// 3. 记录抽奖结果（不扣库存）
pub async fn shake(
    service: web::Data<LuckyDrawService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let visitor = visitor_id(&req);
    match service.draw(&visitor).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            result,
            "Congratulations!",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/claim",
    tag = "lucky_draw",
    responses(
        (status = 200, description = "领奖成功", body = ClaimResponse),
        (status = 400, description = "访客不存在 / 没有抽奖记录 / 奖品库存不足")
    )
)]
/// 领取价值最高的奖品；重复调用返回同一奖品
pub async fn claim(
    service: web::Data<LuckyDrawService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let visitor = visitor_id(&req);
    match service.claim(&visitor).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            result,
            "Reward claimed successfully!",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn lucky_draw_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/status", web::get().to(get_status))
        .route("/shake", web::post().to(shake))
        .route("/claim", web::post().to(claim));
}
