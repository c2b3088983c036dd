use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// 概率总和允许的误差
pub const PROBABILITY_TOLERANCE: f64 = 0.01;

/// 奖品配置
/// - probability: 中奖权重 (0~1)，全表之和应约等于 1
/// - quantity: 总库存
/// - remaining: 剩余库存，仅在领奖时扣减
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    /// 奖品ID (唯一且稳定)
    pub id: u32,
    /// 显示名称
    pub name: String,
    /// 面值 (整数金额)
    pub value: i64,
    /// 外部兑换链接
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_reward: Option<String>,
    /// 中奖概率 (0~1)
    pub probability: f64,
    /// 总数量
    pub quantity: u32,
    /// 剩余数量
    pub remaining: u32,
}

impl Prize {
    /// 是否还有库存
    pub fn in_stock(&self) -> bool {
        self.remaining > 0
    }

    /// 已发放数量
    pub fn distributed(&self) -> u32 {
        self.quantity.saturating_sub(self.remaining)
    }

    fn validate(&self) -> AppResult<()> {
        if !self.probability.is_finite() || !(0.0..=1.0).contains(&self.probability) {
            return Err(AppError::ValidationError(format!(
                "\"{}\": probability must be between 0 and 1",
                self.name
            )));
        }
        if self.remaining > self.quantity {
            return Err(AppError::ValidationError(format!(
                "\"{}\": remaining cannot exceed quantity",
                self.name
            )));
        }
        Ok(())
    }
}

/// 奖品列表中每个奖品的基本约束 (ID 唯一、概率范围、剩余 <= 总量)
///
/// 加载数据文件时使用；不检查概率总和
pub fn validate_prizes(prizes: &[Prize]) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(prizes.len());
    for prize in prizes {
        if !seen.insert(prize.id) {
            return Err(AppError::ValidationError(format!(
                "Duplicate prize id: {}",
                prize.id
            )));
        }
        prize.validate()?;
    }
    Ok(())
}

/// 概率总和
pub fn total_probability(prizes: &[Prize]) -> f64 {
    prizes.iter().map(|p| p.probability).sum()
}

/// 管理员写入奖品配置时的完整校验 (含概率总和 ≈ 1.0)
pub fn validate_catalog(prizes: &[Prize]) -> AppResult<()> {
    validate_prizes(prizes)?;

    let total = total_probability(prizes);
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(AppError::ValidationError(format!(
            "Total probability must be 1.0 (current: {total:.2})"
        )));
    }
    Ok(())
}

/// 更新奖品配置请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCatalogRequest {
    pub rewards: Vec<Prize>,
}

/// 奖品库存概况 (管理后台统计)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrizeStockSummary {
    pub id: u32,
    pub name: String,
    pub quantity: u32,
    pub remaining: u32,
    pub distributed: u32,
}

impl From<&Prize> for PrizeStockSummary {
    fn from(p: &Prize) -> Self {
        PrizeStockSummary {
            id: p.id,
            name: p.name.clone(),
            quantity: p.quantity,
            remaining: p.remaining,
            distributed: p.distributed(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_prize(
    id: u32,
    value: i64,
    probability: f64,
    quantity: u32,
    remaining: u32,
) -> Prize {
    Prize {
        id,
        name: format!("Prize {id}"),
        value,
        link_reward: None,
        probability,
        quantity,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_catalog_accepts_sum_within_tolerance() {
        let list = vec![
            sample_prize(1, 10_000, 0.5, 10, 10),
            sample_prize(2, 20_000, 0.495, 5, 5),
        ];
        assert!(validate_catalog(&list).is_ok());
    }

    #[test]
    fn test_validate_catalog_rejects_bad_sum() {
        let list = vec![
            sample_prize(1, 10_000, 0.5, 10, 10),
            sample_prize(2, 20_000, 0.47, 5, 5),
        ];
        assert!(matches!(
            validate_catalog(&list),
            Err(AppError::ValidationError(_))
        ));
        assert!(validate_catalog(&[]).is_err());
    }

    #[test]
    fn test_validate_catalog_rejects_remaining_over_quantity() {
        let list = vec![sample_prize(1, 10_000, 1.0, 10, 11)];
        assert!(validate_catalog(&list).is_err());
    }

    #[test]
    fn test_validate_prizes_rejects_duplicate_ids_and_bad_probability() {
        let dup = vec![sample_prize(1, 1, 0.5, 1, 1), sample_prize(1, 2, 0.5, 1, 1)];
        assert!(validate_prizes(&dup).is_err());

        let negative = vec![sample_prize(1, 1, -0.1, 1, 1)];
        assert!(validate_prizes(&negative).is_err());

        let nan = vec![sample_prize(1, 1, f64::NAN, 1, 1)];
        assert!(validate_prizes(&nan).is_err());
    }

    #[test]
    fn test_prize_json_uses_camel_case() {
        let json = r#"{"id":3,"name":"Voucher","value":50000,"linkReward":"https://x.y/z","probability":0.2,"quantity":10,"remaining":4}"#;
        let p: Prize = serde_json::from_str(json).unwrap();
        assert_eq!(p.link_reward.as_deref(), Some("https://x.y/z"));
        assert_eq!(p.distributed(), 6);
        assert!(p.in_stock());
    }
}
