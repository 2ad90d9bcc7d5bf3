//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 저장소, 파이프라인, 신선도 게이트를 한데 묶어 Axum의
//! State extractor로 핸들러에 주입됩니다. Arc로 래핑되어 여러 요청 간에
//! 안전하게 공유됩니다.

use std::sync::Arc;

use ranker_analytics::{FreshnessGate, RankingPipeline};
use ranker_core::{kst_now, RankedSnapshot, RankerError, RankerResult};
use ranker_data::{RedisStore, SnapshotStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// 애플리케이션 공유 상태.
pub struct AppState {
    /// 스냅샷 저장소 (트레이트 뒤의 Redis)
    pub store: Arc<dyn SnapshotStore>,

    /// Redis 연결 (헬스 체크 전용). 테스트 상태에서는 None.
    pub redis: Option<Arc<RedisStore>>,

    /// 랭킹 파이프라인
    pub pipeline: Arc<RankingPipeline>,

    /// 신선도 게이트
    pub gate: FreshnessGate,

    /// 재계산 single-flight 락.
    ///
    /// 단일 기록자 계약: 동시에 들어온 stale 요청 중 하나만 사이클을
    /// 실행하고 나머지는 완료를 기다린 뒤 갱신된 스냅샷을 읽습니다.
    refresh_lock: Mutex<()>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        redis: Option<Arc<RedisStore>>,
        pipeline: RankingPipeline,
        gate: FreshnessGate,
    ) -> Self {
        Self {
            store,
            redis,
            pipeline: Arc::new(pipeline),
            gate,
            refresh_lock: Mutex::new(()),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// Redis 연결 상태 확인.
    pub async fn is_redis_healthy(&self) -> bool {
        match &self.redis {
            Some(redis) => redis.health_check().await.unwrap_or(false),
            None => false,
        }
    }

    /// 현재 유효한 스냅샷을 반환합니다.
    ///
    /// 신선도 게이트가 STALE로 판정하면 파이프라인을 실행해 갱신합니다.
    /// 재계산이 실패해도 직전 스냅샷이 있으면 그것을 서빙합니다
    /// (읽기 경로는 실패한 재계산에 무한정 막히지 않습니다).
    pub async fn current_snapshot(&self) -> RankerResult<RankedSnapshot> {
        let marker = self.store.marker().await.map_err(RankerError::from)?;

        if self.gate.is_stale(marker.as_ref(), kst_now()) {
            let _guard = self.refresh_lock.lock().await;

            // 락을 기다리는 동안 다른 요청이 갱신을 끝냈을 수 있으므로 재확인
            let marker = self.store.marker().await.map_err(RankerError::from)?;
            if self.gate.is_stale(marker.as_ref(), kst_now()) {
                match self.pipeline.run_cycle().await {
                    Ok(snapshot) => {
                        info!(stocks = snapshot.len(), "스냅샷 갱신 완료");
                        return Ok(snapshot);
                    }
                    Err(e) if e.is_fatal() => {
                        // 직전 스냅샷이 남아 있으면 오래된 데이터라도 서빙
                        warn!(error = %e, "재계산 실패, 직전 스냅샷으로 폴백");
                        if let Some(snapshot) =
                            self.store.snapshot().await.map_err(RankerError::from)?
                        {
                            return Ok(snapshot);
                        }
                        return Err(e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.store
            .snapshot()
            .await
            .map_err(RankerError::from)?
            .ok_or_else(|| RankerError::NotFound("저장된 스냅샷이 없습니다".to_string()))
    }

    /// 신선도와 무관하게 즉시 전체 사이클을 실행합니다.
    pub async fn force_refresh(&self) -> RankerResult<RankedSnapshot> {
        let _guard = self.refresh_lock.lock().await;
        self.pipeline.run_cycle().await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! 라우트 테스트용 상태 구성.
    //!
    //! 제공자는 전부 실패하는 목으로 두고, 저장소는 메모리 구현을
    //! 시드해서 게이트/폴백 경로를 검증합니다.

    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, NaiveTime, Utc};
    use ranker_analytics::PipelineContext;
    use ranker_core::{
        sector_rank_label, DailyClose, Market, PipelineConfig, RankedStock, TickerCode,
        UpdateMarker, UNKNOWN_SECTOR,
    };
    use ranker_data::{DataError, MarketDataProvider, Result as DataResult, SectorProvider};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// 메모리 스냅샷 저장소.
    #[derive(Default)]
    pub struct MemoryStore {
        inner: RwLock<Option<(RankedSnapshot, UpdateMarker)>>,
    }

    impl MemoryStore {
        pub fn seeded(seed: Option<(RankedSnapshot, UpdateMarker)>) -> Self {
            Self {
                inner: RwLock::new(seed),
            }
        }
    }

    #[async_trait]
    impl SnapshotStore for MemoryStore {
        async fn snapshot(&self) -> DataResult<Option<RankedSnapshot>> {
            Ok(self.inner.read().await.as_ref().map(|(s, _)| s.clone()))
        }

        async fn replace(
            &self,
            snapshot: &RankedSnapshot,
            marker: &UpdateMarker,
        ) -> DataResult<()> {
            *self.inner.write().await = Some((snapshot.clone(), *marker));
            Ok(())
        }

        async fn marker(&self) -> DataResult<Option<UpdateMarker>> {
            Ok(self.inner.read().await.as_ref().map(|(_, m)| *m))
        }
    }

    /// 항상 실패하는 시세 제공자.
    struct FailingMarket;

    #[async_trait]
    impl MarketDataProvider for FailingMarket {
        async fn list_tickers(&self, _market: Market) -> DataResult<Vec<TickerCode>> {
            Err(DataError::FetchError("test provider down".to_string()))
        }

        async fn daily_closes(
            &self,
            _code: &TickerCode,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> DataResult<Vec<DailyClose>> {
            Err(DataError::FetchError("test provider down".to_string()))
        }

        async fn market_caps(
            &self,
            _as_of: NaiveDate,
        ) -> DataResult<HashMap<TickerCode, Decimal>> {
            Err(DataError::FetchError("test provider down".to_string()))
        }

        async fn name(&self, _code: &TickerCode) -> DataResult<String> {
            Err(DataError::FetchError("test provider down".to_string()))
        }
    }

    /// 항상 실패하는 섹터 제공자.
    struct FailingSectors;

    #[async_trait]
    impl SectorProvider for FailingSectors {
        async fn sector_components(
            &self,
            _sector_code: &str,
            _as_of: NaiveDate,
        ) -> DataResult<Vec<(TickerCode, String)>> {
            Err(DataError::FetchError("test provider down".to_string()))
        }

        fn sector_codes(&self) -> &[&'static str] {
            &["G45"]
        }
    }

    /// 백분위 내림차순으로 정렬된 n개 종목 스냅샷.
    pub fn sample_snapshot(n: usize) -> RankedSnapshot {
        let stocks = (0..n)
            .map(|i| RankedStock {
                code: format!("{:06}", (i + 1) * 10),
                name: format!("종목{}", i + 1),
                close_price: dec!(10000),
                relative_strength_percentile: dec!(99) - Decimal::from(i as u64),
                rally_from_low_pct: "+10.00%".to_string(),
                drawdown_from_high_pct: "-5.00%".to_string(),
                sector: UNKNOWN_SECTOR.to_string(),
                market_cap: "600억".to_string(),
                sector_rank_label: sector_rank_label(1),
            })
            .collect();

        RankedSnapshot {
            computed_at: Utc::now(),
            stocks,
        }
    }

    /// 오늘(KST) 마감 후 기록된 마커.
    pub fn today_marker() -> UpdateMarker {
        UpdateMarker::new(
            kst_now().date_naive(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        )
    }

    /// 어제(KST) 기록된 마커.
    pub fn yesterday_marker() -> UpdateMarker {
        UpdateMarker::new(
            kst_now().date_naive() - Duration::days(1),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        )
    }

    /// 테스트용 AppState 생성.
    ///
    /// 제공자가 전부 실패하므로 재계산 경로는 항상 실패하며, 시드된
    /// 스냅샷이 캐시/폴백 동작을 결정합니다.
    pub fn create_test_state(seed: Option<(RankedSnapshot, UpdateMarker)>) -> AppState {
        let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::seeded(seed));
        let pipeline = RankingPipeline::new(PipelineContext {
            market_data: Arc::new(FailingMarket),
            sectors: Arc::new(FailingSectors),
            store: Arc::clone(&store),
            config: PipelineConfig::default(),
        });

        AppState::new(
            store,
            None,
            pipeline,
            FreshnessGate::new(NaiveTime::from_hms_opt(15, 30, 0)),
        )
    }
}
