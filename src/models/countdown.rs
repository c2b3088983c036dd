use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 全局配置 (config.json)
/// end_time: 倒计时结束时间 (epoch millis)，0 表示未启用
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    #[serde(alias = "countdownEndTime", default)]
    pub end_time: i64,
}

/// 倒计时状态响应
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountdownResponse {
    pub end_time: i64,
    pub remaining_ms: i64,
    pub is_active: bool,
}

impl CountdownResponse {
    pub fn at(end_time: i64, now_ms: i64) -> Self {
        let remaining_ms = (end_time - now_ms).max(0);
        CountdownResponse {
            end_time,
            remaining_ms,
            is_active: remaining_ms > 0,
        }
    }
}

/// 设置倒计时请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetCountdownRequest {
    pub end_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_inactive_when_zero_or_past() {
        assert_eq!(
            CountdownResponse::at(0, 1_000),
            CountdownResponse {
                end_time: 0,
                remaining_ms: 0,
                is_active: false
            }
        );
        assert!(!CountdownResponse::at(500, 1_000).is_active);
    }

    #[test]
    fn test_countdown_active_in_future() {
        let c = CountdownResponse::at(5_000, 1_000);
        assert_eq!(c.remaining_ms, 4_000);
        assert!(c.is_active);
    }

    #[test]
    fn test_legacy_config_field() {
        let cfg: GateConfig = serde_json::from_str(r#"{"countdownEndTime":123}"#).unwrap();
        assert_eq!(cfg.end_time, 123);
    }
}
