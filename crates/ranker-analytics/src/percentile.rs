//! 백분위 점수 정규화.
//!
//! 원점수 집합을 순위 기반 백분위로 변환한 뒤 표시용 1~99 스케일로
//! 재조정합니다.
//!
//! - 오름차순 순위, 동점은 동점 그룹의 최소 순위를 공유 (min-rank 방식)
//! - 백분위 = 순위 / 전체 수 ∈ (0, 1]
//! - 표시 점수 = (백분위 × 98 + 1), 소수 2자리 반올림 → (1, 99]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 원점수 목록을 표시용 백분위 점수로 변환합니다.
///
/// 반환 벡터는 입력과 같은 순서입니다. 원점수가 클수록 점수가 크며
/// (단조 비감소), 최대 원점수는 항상 99.00을 받습니다.
pub fn percentile_scores(raw: &[Decimal]) -> Vec<Decimal> {
    let n = raw.len();
    if n == 0 {
        return Vec::new();
    }

    // 값 오름차순으로 정렬한 인덱스에서 min-rank를 계산
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| raw[a].cmp(&raw[b]));

    let mut ranks = vec![0usize; n];
    let mut current_rank = 1usize;
    for (pos, &idx) in order.iter().enumerate() {
        if pos > 0 && raw[idx] != raw[order[pos - 1]] {
            current_rank = pos + 1;
        }
        ranks[idx] = current_rank;
    }

    let total = Decimal::from(n as u64);
    ranks
        .into_iter()
        .map(|rank| {
            let pct = Decimal::from(rank as u64) / total;
            (pct * dec!(98) + dec!(1)).round_dp(2)
        })
        .collect()
}
