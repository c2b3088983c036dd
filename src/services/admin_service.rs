use crate::error::{AppError, AppResult};
use crate::models::{
    AdminStatsResponse, Prize, PrizeStockSummary, VisitorSummary, total_probability,
    validate_catalog,
};
use crate::storage::Stores;

/// 管理后台: 访客台账与奖品配置
#[derive(Clone)]
pub struct AdminService {
    stores: Stores,
    max_attempts: u32,
}

impl AdminService {
    pub fn new(stores: Stores, max_attempts: u32) -> Self {
        Self {
            stores,
            max_attempts,
        }
    }

    /// 所有访客（按首次出现时间排序）
    pub fn list_visitors(&self) -> AppResult<Vec<VisitorSummary>> {
        let ledger = self.stores.load_ledger()?;
        let mut list: Vec<VisitorSummary> = ledger
            .iter()
            .map(|(id, record)| VisitorSummary::new(id, record, self.max_attempts))
            .collect();
        list.sort_by(|a, b| a.first_seen.cmp(&b.first_seen).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    pub async fn delete_visitor(&self, visitor_id: &str) -> AppResult<()> {
        let _guard = self.stores.write_lock().await;
        let mut ledger = self.stores.load_ledger()?;
        if ledger.remove(visitor_id).is_none() {
            return Err(AppError::NotFound(format!("Visitor {visitor_id} not found")));
        }
        self.stores.ledger.save(&ledger)?;
        log::info!("Visitor {visitor_id} deleted");
        Ok(())
    }

    /// 重置访客: 清空次数/抽奖记录/领取状态，保留首次出现时间
    pub async fn reset_visitor(&self, visitor_id: &str) -> AppResult<VisitorSummary> {
        let _guard = self.stores.write_lock().await;
        let mut ledger = self.stores.load_ledger()?;
        let record = ledger
            .get_mut(visitor_id)
            .ok_or_else(|| AppError::NotFound(format!("Visitor {visitor_id} not found")))?;
        record.reset();
        let summary = VisitorSummary::new(visitor_id, record, self.max_attempts);

        self.stores.ledger.save(&ledger)?;
        log::info!("Visitor {visitor_id} reset");
        Ok(summary)
    }

    pub fn list_catalog(&self) -> AppResult<Vec<Prize>> {
        self.stores.load_catalog()
    }

    /// 整体替换奖品配置；校验失败时不写入
    pub async fn update_catalog(&self, prizes: Vec<Prize>) -> AppResult<Vec<Prize>> {
        validate_catalog(&prizes)?;

        let _guard = self.stores.write_lock().await;
        self.stores.catalog.save(&prizes)?;
        log::info!("Catalog updated with {} prizes", prizes.len());
        Ok(prizes)
    }

    /// 所有奖品剩余数量恢复为总数量
    pub async fn reset_catalog_stock(&self) -> AppResult<Vec<Prize>> {
        let _guard = self.stores.write_lock().await;
        let mut catalog = self.stores.load_catalog()?;
        for prize in catalog.iter_mut() {
            prize.remaining = prize.quantity;
        }
        self.stores.catalog.save(&catalog)?;
        log::info!("Catalog stock reset");
        Ok(catalog)
    }

    pub fn stats(&self) -> AppResult<AdminStatsResponse> {
        let ledger = self.stores.load_ledger()?;
        let catalog = self.stores.load_catalog()?;

        Ok(AdminStatsResponse {
            total_visitors: ledger.len(),
            played_visitors: ledger.values().filter(|r| r.attempts > 0).count(),
            claimed_visitors: ledger.values().filter(|r| r.claimed).count(),
            total_probability: total_probability(&catalog),
            prizes: catalog.iter().map(PrizeStockSummary::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::models::sample_prize as prize;
    use crate::services::{CountdownService, LuckyDrawService};

    fn setup(catalog: Vec<Prize>) -> (AdminService, LuckyDrawService, Stores) {
        let stores = Stores::in_memory(catalog);
        let game = GameConfig::default();
        let draw = LuckyDrawService::new(
            stores.clone(),
            CountdownService::new(stores.clone()),
            &game,
        );
        (
            AdminService::new(stores.clone(), game.max_attempts),
            draw,
            stores,
        )
    }

    #[tokio::test]
    async fn test_reset_visitor_preserves_first_seen() {
        let (admin, draw, _) = setup(vec![prize(1, 100, 1.0, 5, 5)]);
        draw.draw("v").await.unwrap();
        draw.claim("v").await.unwrap();
        let first_seen = admin.list_visitors().unwrap()[0].first_seen;

        let summary = admin.reset_visitor("v").await.unwrap();
        assert_eq!(summary.first_seen, first_seen);
        assert_eq!(summary.attempts, 0);
        assert!(summary.draws.is_empty());
        assert!(!summary.claimed);

        let status = draw.get_status("v").unwrap();
        assert_eq!(status.attempts, 0);
        assert!(!status.claimed);
        // 重置后可以重新参与
        assert!(draw.draw("v").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_and_reset_unknown_visitor() {
        let (admin, draw, _) = setup(vec![prize(1, 100, 1.0, 5, 5)]);
        assert!(matches!(
            admin.delete_visitor("ghost").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            admin.reset_visitor("ghost").await,
            Err(AppError::NotFound(_))
        ));

        draw.draw("v").await.unwrap();
        admin.delete_visitor("v").await.unwrap();
        assert!(admin.list_visitors().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_catalog_leaves_store_unchanged() {
        let original = vec![prize(1, 100, 1.0, 5, 5)];
        let (admin, _, _) = setup(original.clone());

        let bad = vec![prize(1, 100, 0.5, 5, 5), prize(2, 50, 0.47, 5, 5)];
        assert!(matches!(
            admin.update_catalog(bad).await,
            Err(AppError::ValidationError(_))
        ));
        let over = vec![prize(1, 100, 1.0, 5, 6)];
        assert!(admin.update_catalog(over).await.is_err());

        assert_eq!(admin.list_catalog().unwrap(), original);
    }

    #[tokio::test]
    async fn test_update_and_reset_stock() {
        let (admin, _, _) = setup(vec![]);
        let catalog = vec![prize(1, 100, 0.3, 10, 2), prize(2, 50, 0.7, 20, 0)];
        admin.update_catalog(catalog.clone()).await.unwrap();
        assert_eq!(admin.list_catalog().unwrap(), catalog);

        let reset = admin.reset_catalog_stock().await.unwrap();
        assert!(reset.iter().all(|p| p.remaining == p.quantity));
        assert_eq!(admin.list_catalog().unwrap(), reset);
    }

    #[tokio::test]
    async fn test_stats() {
        let (admin, draw, _) = setup(vec![prize(1, 100, 1.0, 5, 5)]);
        draw.draw("a").await.unwrap();
        draw.draw("b").await.unwrap();
        draw.claim("b").await.unwrap();

        let stats = admin.stats().unwrap();
        assert_eq!(stats.total_visitors, 2);
        assert_eq!(stats.played_visitors, 2);
        assert_eq!(stats.claimed_visitors, 1);
        assert!((stats.total_probability - 1.0).abs() < 1e-9);
        assert_eq!(stats.prizes[0].distributed, 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_can_be_repaired() {
        let (admin, draw, stores) = setup(vec![prize(1, 100, 1.0, 5, 5)]);
        let mut ledger = crate::models::VisitorLedger::new();
        for id in ["bad", "worse"] {
            let mut broken = crate::models::VisitorRecord::new(0);
            broken.attempts = 2;
            ledger.insert(id.into(), broken);
        }
        stores.ledger.save(&ledger).unwrap();

        assert_eq!(admin.list_visitors().unwrap().len(), 2);

        let summary = admin.reset_visitor("bad").await.unwrap();
        assert_eq!(summary.attempts, 0);
        assert!(draw.draw("bad").await.is_ok());

        admin.delete_visitor("worse").await.unwrap();
        assert!(stores.load_ledger_strict(3).is_ok());
    }
}
