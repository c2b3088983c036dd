use rand::Rng;

use crate::models::Prize;

/// 按概率抽取一个奖品（仅在有库存的奖品中抽取）
///
/// 1. 过滤掉 remaining == 0 的奖品，全部无库存时返回 None
/// 2. 以剩余奖品的概率之和为总权重 (缺货奖品的概率按比例分摊给其余奖品)
/// 3. 取 r ∈ (0, total]，依次减去各奖品概率，第一个使 r <= 0 的奖品中奖
/// 4. 浮点误差导致遍历结束 r 仍 > 0 时，回退为第一个可用奖品
pub fn pick<'a, R: Rng + ?Sized>(catalog: &'a [Prize], rng: &mut R) -> Option<&'a Prize> {
    let available: Vec<&Prize> = catalog.iter().filter(|p| p.in_stock()).collect();
    let first = *available.first()?;

    let total: f64 = available.iter().map(|p| p.probability).sum();
    let mut r = total * (1.0 - rng.r#gen::<f64>());

    for prize in available {
        r -= prize.probability;
        if r <= 0.0 {
            return Some(prize);
        }
    }

    Some(first)
}
