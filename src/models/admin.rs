use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PrizeStockSummary;

/// 管理员登录请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录状态
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub username: Option<String>,
}

/// 已登录的管理员身份 (中间件注入请求扩展)
#[derive(Debug, Clone, PartialEq)]
pub struct AdminIdentity {
    pub username: String,
    pub session_id: String,
}

/// 管理后台统计
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub total_visitors: usize,
    pub played_visitors: usize,
    pub claimed_visitors: usize,
    pub total_probability: f64,
    pub prizes: Vec<PrizeStockSummary>,
}
