use crate::config::GameConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    ClaimResponse, DrawEntry, DrawResponse, Prize, VisitorRecord, VisitorStatusResponse,
};
use crate::services::countdown_service::now_millis;
use crate::services::{CountdownService, reward_selector};
use crate::storage::Stores;

#[derive(Clone)]
pub struct LuckyDrawService {
    stores: Stores,
    countdown: CountdownService,
    max_attempts: u32,
    enforce_countdown: bool,
}

impl LuckyDrawService {
    pub fn new(stores: Stores, countdown: CountdownService, game: &GameConfig) -> Self {
        Self {
            stores,
            countdown,
            max_attempts: game.max_attempts,
            enforce_countdown: game.enforce_countdown,
        }
    }

    /// 查询访客状态（不创建记录，未出现过的访客返回零值）
    pub fn get_status(&self, visitor_id: &str) -> AppResult<VisitorStatusResponse> {
        let ledger = self.stores.load_ledger()?;
        let record = ledger.get(visitor_id);
        if let Some(record) = record {
            record.validate(visitor_id, self.max_attempts)?;
        }
        Ok(VisitorStatusResponse::from_record(record, self.max_attempts))
    }

    /// 摇树 (Draw)
    ///
    /// 逻辑:
    /// 1. 校验剩余次数与领奖状态
    /// 2. 在有库存的奖品中按概率抽取
    /// 3. 追加奖品快照、次数 +1 并保存台账
    ///
    /// 注意：此处不扣减库存，库存只在领奖时扣减
    pub async fn draw(&self, visitor_id: &str) -> AppResult<DrawResponse> {
        self.ensure_open()?;
        let _guard = self.stores.write_lock().await;

        let mut ledger = self.stores.load_ledger()?;
        let now = now_millis();
        let mut record = match ledger.get(visitor_id) {
            Some(existing) => {
                existing.validate(visitor_id, self.max_attempts)?;
                existing.clone()
            }
            None => VisitorRecord::new(now),
        };

        if record.attempts >= self.max_attempts {
            log::warn!("Visitor {visitor_id} has no attempts left");
            return Err(AppError::AttemptsExhausted);
        }
        if record.claimed {
            log::warn!("Visitor {visitor_id} tried to draw after claiming");
            return Err(AppError::AlreadyClaimed);
        }

        let catalog = self.stores.load_catalog()?;
        let Some(prize) = select_prize(&catalog) else {
            log::warn!("Draw rejected for {visitor_id}: every prize is out of stock");
            return Err(AppError::OutOfStock);
        };

        let draw = DrawEntry::snapshot(&prize, now);
        record.draws.push(draw.clone());
        record.attempts += 1;
        let attempts = record.attempts;

        ledger.insert(visitor_id.to_string(), record);
        self.stores.ledger.save(&ledger)?;

        log::info!(
            "Visitor {visitor_id} drew prize {} ({}) [{attempts}/{}]",
            draw.id,
            draw.name,
            self.max_attempts
        );

        Ok(DrawResponse {
            draw,
            attempts,
            max_attempts: self.max_attempts,
        })
    }

    /// 领奖 (Claim)
    ///
    /// 逻辑:
    /// 1. 已领取则直接返回之前的奖励（幂等）
    /// 2. 取价值最高的一次抽奖，价值相同取最早
    /// 3. 对应奖品库存为 0 或已被删除 -> StockExhausted
    /// 4. 库存 -1，标记已领取，先保存奖品表再保存台账；台账写入失败时回滚奖品表
    pub async fn claim(&self, visitor_id: &str) -> AppResult<ClaimResponse> {
        self.ensure_open()?;
        let _guard = self.stores.write_lock().await;

        let mut ledger = self.stores.load_ledger()?;
        let record = ledger
            .get_mut(visitor_id)
            .ok_or(AppError::UnknownVisitor)?;
        record.validate(visitor_id, self.max_attempts)?;

        if record.draws.is_empty() {
            return Err(AppError::NoDraws);
        }

        if record.claimed {
            let reward = record.final_reward.clone().ok_or_else(|| {
                AppError::StorageError(format!("visitor {visitor_id}: claimed without reward"))
            })?;
            return Ok(ClaimResponse { reward });
        }

        let best = record.best_draw().cloned().ok_or(AppError::NoDraws)?;

        let mut catalog = self.stores.load_catalog()?;
        let previous_catalog = catalog.clone();
        let prize = catalog
            .iter_mut()
            .find(|p| p.id == best.id)
            .filter(|p| p.remaining > 0)
            .ok_or_else(|| {
                log::warn!(
                    "Claim rejected for {visitor_id}: prize {} is out of stock",
                    best.id
                );
                AppError::StockExhausted
            })?;
        prize.remaining -= 1;
        let remaining = prize.remaining;

        record.claimed = true;
        record.final_reward = Some(best.clone());

        self.stores.catalog.save(&catalog)?;
        if let Err(e) = self.stores.ledger.save(&ledger) {
            log::error!("Failed to persist claim for {visitor_id}, restoring catalog: {e}");
            if let Err(rollback) = self.stores.catalog.save(&previous_catalog) {
                log::error!("Failed to restore catalog after claim failure: {rollback}");
            }
            return Err(e);
        }

        log::info!(
            "Visitor {visitor_id} claimed prize {} ({}), {remaining} left",
            best.id,
            best.name
        );

        Ok(ClaimResponse { reward: best })
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.enforce_countdown && !self.countdown.is_open()? {
            return Err(AppError::GameNotOpen);
        }
        Ok(())
    }
}

fn select_prize(catalog: &[Prize]) -> Option<Prize> {
    let mut rng = rand::thread_rng();
    reward_selector::pick(catalog, &mut rng).cloned()
}
