//! 섹터별 모멘텀 집계.
//!
//! 적격 종목 전체(시가총액 하한 적용 전)의 원점수를 섹터별로 묶어
//! 산술 평균을 구하고, 평균 내림차순으로 순위를 매깁니다.
//! 평균이 같은 섹터는 섹터명 오름차순으로 순서를 고정합니다.

use ranker_core::UNKNOWN_SECTOR;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 섹터 집계 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorScore {
    /// 섹터명
    pub sector: String,
    /// 섹터 내 종목 수
    pub symbol_count: usize,
    /// 섹터 평균 원점수
    pub mean_score: Decimal,
    /// 순위 (1이 가장 강한 섹터)
    pub rank: u32,
}

/// (섹터명, 원점수) 목록을 섹터별 평균과 순위로 집계합니다.
///
/// 섹터명이 비어 있으면 [`UNKNOWN_SECTOR`]로 취급하며, 해당 그룹도
/// 다른 섹터와 동일하게 순위에 참여합니다. 반환 벡터는 순위순입니다.
pub fn aggregate_sectors(inputs: &[(String, Decimal)]) -> Vec<SectorScore> {
    if inputs.is_empty() {
        return Vec::new();
    }

    let mut grouped: HashMap<&str, Vec<Decimal>> = HashMap::new();
    for (sector, score) in inputs {
        let key = if sector.is_empty() {
            UNKNOWN_SECTOR
        } else {
            sector.as_str()
        };
        grouped.entry(key).or_default().push(*score);
    }

    let mut results: Vec<SectorScore> = grouped
        .into_iter()
        .map(|(sector, scores)| {
            let symbol_count = scores.len();
            let mean_score =
                scores.iter().sum::<Decimal>() / Decimal::from(symbol_count as u64);
            SectorScore {
                sector: sector.to_string(),
                symbol_count,
                mean_score,
                rank: 0, // 정렬 후 부여
            }
        })
        .collect();

    // 평균 내림차순, 동점은 섹터명 오름차순 (결정적 tie-break)
    results.sort_by(|a, b| {
        b.mean_score
            .cmp(&a.mean_score)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    for (idx, result) in results.iter_mut().enumerate() {
        result.rank = (idx + 1) as u32;
    }

    results
}

/// 집계 결과에서 섹터명 → 순위 매핑을 만듭니다.
pub fn sector_rank_map(results: &[SectorScore]) -> HashMap<String, u32> {
    results
        .iter()
        .map(|r| (r.sector.clone(), r.rank))
        .collect()
}
