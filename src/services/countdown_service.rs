use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::{CountdownResponse, GateConfig};
use crate::storage::Stores;

#[derive(Clone)]
pub struct CountdownService {
    stores: Stores,
}

impl CountdownService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// 当前倒计时状态
    pub fn get_countdown(&self) -> AppResult<CountdownResponse> {
        let gate = self.stores.gate.load()?;
        Ok(CountdownResponse::at(gate.end_time, now_millis()))
    }

    /// 设置倒计时结束时间 (0 表示关闭)
    pub async fn set_countdown(&self, end_time: i64) -> AppResult<CountdownResponse> {
        if end_time < 0 {
            return Err(AppError::InvalidTime(
                "End time must be a non-negative epoch milliseconds value".into(),
            ));
        }

        let _guard = self.stores.write_lock().await;
        let mut gate: GateConfig = self.stores.gate.load()?;
        gate.end_time = end_time;
        self.stores.gate.save(&gate)?;

        if end_time == 0 {
            log::info!("Countdown cleared");
        } else {
            log::info!("Countdown set to end at {end_time}");
        }
        Ok(CountdownResponse::at(end_time, now_millis()))
    }

    /// 倒计时是否已结束 (游戏可玩)
    pub fn is_open(&self) -> AppResult<bool> {
        Ok(!self.get_countdown()?.is_active)
    }
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_countdown_is_inactive() {
        let service = CountdownService::new(Stores::in_memory(vec![]));
        let c = service.get_countdown().unwrap();
        assert_eq!(c.end_time, 0);
        assert_eq!(c.remaining_ms, 0);
        assert!(!c.is_active);
        assert!(service.is_open().unwrap());
    }

    #[tokio::test]
    async fn test_set_future_countdown() {
        let service = CountdownService::new(Stores::in_memory(vec![]));
        let end = now_millis() + 60_000;
        service.set_countdown(end).await.unwrap();

        let c = service.get_countdown().unwrap();
        assert_eq!(c.end_time, end);
        assert!(c.is_active);
        assert!(c.remaining_ms > 0 && c.remaining_ms <= 60_000);
        assert!(!service.is_open().unwrap());

        service.set_countdown(0).await.unwrap();
        assert!(service.is_open().unwrap());
    }

    #[tokio::test]
    async fn test_negative_end_time_rejected() {
        let service = CountdownService::new(Stores::in_memory(vec![]));
        assert!(matches!(
            service.set_countdown(-1).await,
            Err(AppError::InvalidTime(_))
        ));
        assert_eq!(service.get_countdown().unwrap().end_time, 0);
    }
}
