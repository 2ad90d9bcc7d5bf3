//! 상대강도 랭킹 계산.
//!
//! 이 crate는 랭킹 시스템의 핵심 로직을 제공합니다:
//! - 모멘텀 점수 계산 (다구간 가격 비율, 최근 2주 가중)
//! - 백분위 정규화 (min-rank 방식, 1~99 스케일)
//! - 섹터별 평균 점수 집계 및 순위
//! - 전체 사이클을 조율하는 랭킹 파이프라인
//! - 캐시 신선도 판정 게이트

pub mod freshness;
pub mod momentum;
pub mod percentile;
pub mod pipeline;
pub mod sector;

pub use freshness::{Freshness, FreshnessGate};
pub use momentum::{score_series, MomentumScore, MIN_OBSERVATIONS};
pub use percentile::percentile_scores;
pub use pipeline::{PipelineContext, RankingPipeline};
pub use sector::{aggregate_sectors, sector_rank_map, SectorScore};
