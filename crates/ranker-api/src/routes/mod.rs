//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/stocks` - 상대강도 랭킹 조회 (페이지네이션)
//! - `/refresh` - 즉시 재계산 트리거

pub mod health;
pub mod refresh;
pub mod stocks;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use refresh::{refresh_router, RefreshResponse};
pub use stocks::{stocks_router, StocksQuery, StocksResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .merge(stocks_router())
        .merge(refresh_router())
}
