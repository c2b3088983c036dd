use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::Prize;
use crate::error::{AppError, AppResult};

/// 抽奖记录 (奖品快照 + 时间)
/// 写入后不可变，后续修改奖品配置不影响历史记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrawEntry {
    pub id: u32,
    pub name: String,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_reward: Option<String>,
    /// 抽中时间 (epoch millis)
    pub timestamp: i64,
}

impl DrawEntry {
    pub fn snapshot(prize: &Prize, timestamp: i64) -> Self {
        DrawEntry {
            id: prize.id,
            name: prize.name.clone(),
            value: prize.value,
            link_reward: prize.link_reward.clone(),
            timestamp,
        }
    }
}

/// 访客记录 (按访客标识存储)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub attempts: u32,
    /// 按抽奖顺序排列; 兼容旧数据文件中的 "rewards" 字段
    #[serde(alias = "rewards", default)]
    pub draws: Vec<DrawEntry>,
    #[serde(default)]
    pub claimed: bool,
    /// 首次出现时间 (epoch millis)
    #[serde(default)]
    pub first_seen: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_reward: Option<DrawEntry>,
}

impl VisitorRecord {
    pub fn new(first_seen: i64) -> Self {
        VisitorRecord {
            attempts: 0,
            draws: Vec::new(),
            claimed: false,
            first_seen,
            final_reward: None,
        }
    }

    pub fn best_draw(&self) -> Option<&DrawEntry> {
        best_draw(&self.draws)
    }

    /// 清空抽奖状态，保留 first_seen
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.draws.clear();
        self.claimed = false;
        self.final_reward = None;
    }

    pub fn state(&self, max_attempts: u32) -> VisitorState {
        if self.claimed {
            VisitorState::Claimed
        } else if self.attempts == 0 {
            VisitorState::New
        } else if self.attempts < max_attempts {
            VisitorState::Playing
        } else {
            VisitorState::Exhausted
        }
    }

    /// 校验单条记录的一致性
    pub fn validate(&self, id: &str, max_attempts: u32) -> AppResult<()> {
        if self.attempts as usize != self.draws.len() {
            return Err(AppError::StorageError(format!(
                "visitor {id}: attempts ({}) does not match draws ({})",
                self.attempts,
                self.draws.len()
            )));
        }
        if self.attempts > max_attempts {
            log::warn!(
                "Visitor {id} has {} attempts, above the configured maximum {max_attempts}",
                self.attempts
            );
        }
        if self.claimed && self.final_reward.is_none() {
            return Err(AppError::StorageError(format!(
                "visitor {id}: claimed without final reward"
            )));
        }
        Ok(())
    }
}

/// 访客状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitorState {
    New,
    Playing,
    Exhausted,
    Claimed,
}

/// 访客台账: 访客标识 -> 记录
pub type VisitorLedger = BTreeMap<String, VisitorRecord>;

/// 加载台账后校验每条记录
pub fn validate_ledger(ledger: &VisitorLedger, max_attempts: u32) -> AppResult<()> {
    for (id, record) in ledger {
        record.validate(id, max_attempts)?;
    }
    Ok(())
}

/// 价值最高的一次抽奖；价值相同时取最早的一次
pub fn best_draw(draws: &[DrawEntry]) -> Option<&DrawEntry> {
    draws.iter().fold(None, |best: Option<&DrawEntry>, d| match best {
        Some(b) if b.value >= d.value => Some(b),
        _ => Some(d),
    })
}

/// 访客状态响应
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStatusResponse {
    pub attempts: u32,
    pub max_attempts: u32,
    pub draws: Vec<DrawEntry>,
    pub best_draw_so_far: Option<DrawEntry>,
    pub claimed: bool,
    pub state: VisitorState,
}

impl VisitorStatusResponse {
    pub fn from_record(record: Option<&VisitorRecord>, max_attempts: u32) -> Self {
        match record {
            Some(r) => VisitorStatusResponse {
                attempts: r.attempts,
                max_attempts,
                draws: r.draws.clone(),
                best_draw_so_far: r.best_draw().cloned(),
                claimed: r.claimed,
                state: r.state(max_attempts),
            },
            None => VisitorStatusResponse {
                attempts: 0,
                max_attempts,
                draws: Vec::new(),
                best_draw_so_far: None,
                claimed: false,
                state: VisitorState::New,
            },
        }
    }
}

/// 摇树响应
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrawResponse {
    pub draw: DrawEntry,
    pub attempts: u32,
    pub max_attempts: u32,
}

/// 领奖响应
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub reward: DrawEntry,
}

/// 管理后台访客列表项
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSummary {
    pub id: String,
    pub attempts: u32,
    pub draws: Vec<DrawEntry>,
    pub best_draw: Option<DrawEntry>,
    pub claimed: bool,
    pub first_seen: i64,
    pub final_reward: Option<DrawEntry>,
    pub state: VisitorState,
}

impl VisitorSummary {
    pub fn new(id: &str, record: &VisitorRecord, max_attempts: u32) -> Self {
        VisitorSummary {
            id: id.to_string(),
            attempts: record.attempts,
            draws: record.draws.clone(),
            best_draw: record.best_draw().cloned(),
            claimed: record.claimed,
            first_seen: record.first_seen,
            final_reward: record.final_reward.clone(),
            state: record.state(max_attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, value: i64, timestamp: i64) -> DrawEntry {
        DrawEntry {
            id,
            name: format!("Prize {id}"),
            value,
            link_reward: None,
            timestamp,
        }
    }

    #[test]
    fn test_best_draw_keeps_first_on_tie() {
        let draws = vec![entry(1, 100, 1), entry(2, 500, 2), entry(3, 500, 3)];
        let best = best_draw(&draws).unwrap();
        assert_eq!(best.id, 2);
        assert!(best_draw(&[]).is_none());
    }

    #[test]
    fn test_state_transitions() {
        let mut r = VisitorRecord::new(10);
        assert_eq!(r.state(3), VisitorState::New);
        r.attempts = 1;
        r.draws.push(entry(1, 1, 1));
        assert_eq!(r.state(3), VisitorState::Playing);
        r.attempts = 3;
        assert_eq!(r.state(3), VisitorState::Exhausted);
        r.claimed = true;
        assert_eq!(r.state(3), VisitorState::Claimed);
    }

    #[test]
    fn test_reset_preserves_first_seen() {
        let mut r = VisitorRecord::new(42);
        r.attempts = 1;
        r.draws.push(entry(1, 1, 1));
        r.claimed = true;
        r.final_reward = Some(entry(1, 1, 1));
        r.reset();
        assert_eq!(r, VisitorRecord::new(42));
    }

    #[test]
    fn test_legacy_rewards_field_is_accepted() {
        let json = r#"{"attempts":1,"rewards":[{"id":1,"name":"A","value":5,"timestamp":7}],"claimed":false,"firstSeen":3}"#;
        let r: VisitorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.draws.len(), 1);
        assert_eq!(r.first_seen, 3);
    }

    #[test]
    fn test_validate_ledger_rejects_mismatched_attempts() {
        let mut ledger = VisitorLedger::new();
        let mut r = VisitorRecord::new(0);
        r.attempts = 2;
        ledger.insert("1.2.3.4".into(), r);
        assert!(validate_ledger(&ledger, 3).is_err());
    }

    #[test]
    fn test_unseen_visitor_status_defaults() {
        let s = VisitorStatusResponse::from_record(None, 3);
        assert_eq!(s.attempts, 0);
        assert_eq!(s.max_attempts, 3);
        assert!(s.best_draw_so_far.is_none());
        assert!(!s.claimed);
    }
}
