//! 랭킹 파이프라인.
//!
//! 하루 한 번의 전체 계산 사이클을 조율합니다:
//! 유니버스 구성 → 섹터 크롤링 → 종목별 모멘텀 점수 → 섹터 집계 →
//! 시가총액 하한 필터 → 백분위 정규화 → 스냅샷 영속화.
//!
//! 제공자와 저장소는 전부 트레이트 뒤에 있고, 파이프라인은 명시적인
//! 컨텍스트 객체로 이들을 주입받습니다. 전역 가변 상태는 없습니다.
//!
//! # 실패 정책
//!
//! - 개별 종목 점수 실패(짧은 이력, 시세 조회 실패, 종목명 없음)는
//!   해당 종목만 제외합니다.
//! - 개별 섹터 크롤링 실패는 해당 섹터만 건너뛰고, 매핑되지 않은 종목은
//!   "알 수 없음" 섹터로 집계에 참여합니다.
//! - 유니버스/시가총액 조회 실패는 사이클 전체를 중단하며, 부분 스냅샷은
//!   절대 저장되지 않습니다. 직전 스냅샷이 다음 성공 사이클까지 유효합니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, NaiveDate, Timelike, Utc};
use futures::{stream, StreamExt};
use ranker_core::{
    format_drawdown_pct, format_market_cap, format_rally_pct, kst_now, sector_rank_label,
    Market, PipelineConfig, RankedSnapshot, RankedStock, RankerError, RankerResult, TickerCode,
    UpdateMarker, UNKNOWN_SECTOR,
};
use ranker_data::{MarketDataProvider, SectorProvider, SnapshotStore};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::momentum::{score_series, MomentumScore};
use crate::percentile::percentile_scores;
use crate::sector::{aggregate_sectors, sector_rank_map};

/// 파이프라인이 소비하는 협력자 묶음.
pub struct PipelineContext {
    /// 시세/메타데이터 제공자
    pub market_data: Arc<dyn MarketDataProvider>,
    /// 섹터 분류 제공자
    pub sectors: Arc<dyn SectorProvider>,
    /// 스냅샷 저장소
    pub store: Arc<dyn SnapshotStore>,
    /// 파이프라인 설정
    pub config: PipelineConfig,
}

/// 적격 판정을 통과한 종목의 중간 결과.
#[derive(Debug, Clone)]
struct ScoredTicker {
    code: TickerCode,
    name: String,
    score: MomentumScore,
}

/// 랭킹 파이프라인.
pub struct RankingPipeline {
    ctx: PipelineContext,
}

impl RankingPipeline {
    /// 새 파이프라인을 생성합니다.
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    /// 전체 사이클을 실행하고 저장된 스냅샷을 반환합니다.
    pub async fn run_cycle(&self) -> RankerResult<RankedSnapshot> {
        let started = Instant::now();
        let now = kst_now();
        // 당일 장중에는 당일 데이터가 완결되지 않으므로 전일을 기준일로 사용
        let as_of = now.date_naive() - Duration::days(1);
        let start_date = as_of - Duration::days(self.ctx.config.lookback_days);

        info!(as_of = %as_of, "랭킹 사이클 시작");

        // 1. 유니버스: 두 시장의 합집합, 보통주만 유지
        let mut universe: Vec<TickerCode> = Vec::new();
        for market in Market::ALL {
            let tickers = self.ctx.market_data.list_tickers(market).await.map_err(|e| {
                RankerError::Universe(format!("{} 유니버스 조회 실패: {}", market, e))
            })?;
            universe.extend(tickers);
        }
        universe.retain(|code| code.is_common_share());
        info!(count = universe.len(), "보통주 유니버스 구성 완료");

        // 2. 섹터 분류 크롤링 (개별 실패 허용)
        let sector_map = self.crawl_sectors(as_of).await;

        // 3. 종목별 모멘텀 점수 (개별 실패/부적격은 제외)
        let mut scored = self.score_universe(&universe, start_date, as_of).await;
        // buffer_unordered 완료 순서는 비결정적이므로 코드순으로 고정
        scored.sort_by(|a, b| a.code.cmp(&b.code));
        info!(
            eligible = scored.len(),
            skipped = universe.len() - scored.len(),
            "모멘텀 점수 계산 완료"
        );

        // 4. 섹터 집계 — 시가총액 하한 적용 *전*의 적격 전체가 입력
        let sector_inputs: Vec<(String, Decimal)> = scored
            .iter()
            .map(|s| (self.sector_of(&sector_map, &s.code), s.score.total_score))
            .collect();
        let sector_scores = aggregate_sectors(&sector_inputs);
        let sector_ranks = sector_rank_map(&sector_scores);
        info!(sectors = sector_scores.len(), "섹터 집계 완료");

        // 5. 시가총액 (실패 시 사이클 중단)
        let caps = self
            .ctx
            .market_data
            .market_caps(as_of)
            .await
            .map_err(|e| RankerError::Universe(format!("시가총액 조회 실패: {}", e)))?;

        // 6. 하한 필터 — 경계값은 포함, 누락 종목은 0으로 간주되어 제외
        let floor = self.ctx.config.market_cap_floor;
        let filtered: Vec<(ScoredTicker, Decimal)> = scored
            .into_iter()
            .map(|s| {
                let cap = caps.get(&s.code).copied().unwrap_or(Decimal::ZERO);
                (s, cap)
            })
            .filter(|(_, cap)| *cap >= floor)
            .collect();

        // 7. 백분위 점수 — 필터 통과 모집단 기준
        let raw_scores: Vec<Decimal> =
            filtered.iter().map(|(s, _)| s.score.total_score).collect();
        let percentiles = percentile_scores(&raw_scores);

        // 8~9. 출력 레코드 구성 (섹터 순위 라벨, 시가총액 억 단위 표기)
        let stocks: Vec<RankedStock> = filtered
            .into_iter()
            .zip(percentiles)
            .map(|((s, cap), percentile)| {
                let sector = self.sector_of(&sector_map, &s.code);
                let rank = sector_ranks.get(&sector).copied().unwrap_or(0);
                RankedStock {
                    code: s.code.as_str().to_string(),
                    name: s.name,
                    close_price: s.score.close,
                    relative_strength_percentile: percentile,
                    rally_from_low_pct: format_rally_pct(s.score.rally_from_low_pct),
                    drawdown_from_high_pct: format_drawdown_pct(s.score.drawdown_from_high_pct),
                    sector,
                    market_cap: format_market_cap(cap),
                    sector_rank_label: sector_rank_label(rank),
                }
            })
            .collect();

        // 10. 백분위 내림차순 정렬
        let mut snapshot = RankedSnapshot {
            computed_at: Utc::now(),
            stocks,
        };
        snapshot.sort_descending();

        // 11. 스냅샷 + 마커 원자적 교체
        let marker = UpdateMarker::new(
            now.date_naive(),
            now.time().with_nanosecond(0).unwrap_or_else(|| now.time()),
        );
        self.ctx
            .store
            .replace(&snapshot, &marker)
            .await
            .map_err(RankerError::from)?;

        info!(
            stocks = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "랭킹 사이클 완료"
        );
        Ok(snapshot)
    }

    /// 종목의 섹터명. 매핑이 없으면 "알 수 없음".
    fn sector_of(&self, sector_map: &HashMap<TickerCode, String>, code: &TickerCode) -> String {
        sector_map
            .get(code)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_SECTOR.to_string())
    }

    /// WICS 섹터 코드 전체를 제한된 동시성으로 크롤링합니다.
    ///
    /// 각 종목 코드는 정확히 하나의 섹터 호출에서만 기록되므로 공유 매핑
    /// 병합은 안전합니다. 개별 호출 실패는 경고만 남기고 건너뜁니다.
    async fn crawl_sectors(&self, as_of: NaiveDate) -> HashMap<TickerCode, String> {
        let futures: Vec<_> = self
            .ctx
            .sectors
            .sector_codes()
            .iter()
            .map(|&sector_code| {
                let provider = Arc::clone(&self.ctx.sectors);
                async move {
                    match provider.sector_components(sector_code, as_of).await {
                        Ok(components) => Some(components),
                        Err(e) => {
                            warn!(sector_code = sector_code, error = %e, "섹터 크롤링 실패, 건너뜀");
                            None
                        }
                    }
                }
            })
            .collect();

        let results: Vec<Option<Vec<(TickerCode, String)>>> = stream::iter(futures)
            .buffer_unordered(self.ctx.config.sector_workers)
            .collect()
            .await;

        let mut map = HashMap::new();
        for components in results.into_iter().flatten() {
            for (code, sector_name) in components {
                map.insert(code, sector_name);
            }
        }

        info!(mapped = map.len(), "섹터 매핑 구성 완료");
        map
    }

    /// 유니버스 전체를 제한된 동시성으로 점수화합니다.
    ///
    /// 시세 조회, 점수 계산, 종목명 조회 중 하나라도 실패하면 해당 종목만
    /// 제외합니다. 형제 태스크는 취소되지 않습니다.
    async fn score_universe(
        &self,
        universe: &[TickerCode],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<ScoredTicker> {
        let min_observations = self.ctx.config.min_observations;

        let futures: Vec<_> = universe
            .iter()
            .cloned()
            .map(|code| {
                let provider = Arc::clone(&self.ctx.market_data);
                async move {
                    let closes = match provider.daily_closes(&code, start_date, end_date).await {
                        Ok(closes) => closes,
                        Err(e) => {
                            debug!(code = %code, error = %e, "시세 조회 실패, 제외");
                            return None;
                        }
                    };

                    let score = score_series(&closes, min_observations)?;

                    let name = match provider.name(&code).await {
                        Ok(name) => name,
                        Err(e) => {
                            debug!(code = %code, error = %e, "종목명 조회 실패, 제외");
                            return None;
                        }
                    };

                    Some(ScoredTicker { code, name, score })
                }
            })
            .collect();

        let results: Vec<Option<ScoredTicker>> = stream::iter(futures)
            .buffer_unordered(self.ctx.config.scoring_workers)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}
