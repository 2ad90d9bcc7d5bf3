//! 랭킹 조회 라우트.
//!
//! `GET /stocks?page=<n>&limit=<m>` — 백분위 점수 내림차순 스냅샷의
//! 오프셋 기반 페이지네이션을 제공합니다. 요청 시점에 신선도 게이트를
//! 통과시켜 필요하면 사이클을 실행하고, 재계산이 실패해도 직전
//! 스냅샷이 있으면 그대로 서빙합니다.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;
use ranker_core::{RankedStock, RankerError};

/// 랭킹 조회 쿼리.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StocksQuery {
    /// 페이지 번호 (1부터, 기본 1)
    #[serde(default = "default_page")]
    pub page: usize,

    /// 페이지당 레코드 수 (기본 100)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    100
}

/// 랭킹 조회 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct StocksResponse {
    /// 요청 페이지의 종목 목록 (백분위 내림차순)
    pub stocks: Vec<RankedStock>,
    /// 전체 페이지 수 (ceil(total / limit))
    pub total_pages: usize,
    /// 현재 페이지
    pub current_page: usize,
}

/// 오프셋 기반 페이지 슬라이스 계산.
///
/// `start = (page-1)·limit`, `[start, start+limit)` 구간을 반환하며
/// 범위를 벗어난 페이지는 빈 목록이 됩니다.
pub fn paginate(stocks: &[RankedStock], page: usize, limit: usize) -> (Vec<RankedStock>, usize) {
    let page = page.max(1);
    let limit = limit.max(1);

    let total_pages = stocks.len().div_ceil(limit);
    let start = (page - 1).saturating_mul(limit);
    let end = start.saturating_add(limit).min(stocks.len());

    let page_slice = if start >= stocks.len() {
        Vec::new()
    } else {
        stocks[start..end].to_vec()
    };

    (page_slice, total_pages)
}

/// RankerError를 HTTP 응답으로 변환합니다.
fn into_api_error(err: RankerError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code) = match &err {
        RankerError::NotFound(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_READY"),
        RankerError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "CYCLE_FAILED"),
    };
    (status, Json(ApiErrorResponse::new(code, err.to_string())))
}

/// GET /stocks - 상대강도 랭킹 조회.
#[utoipa::path(
    get,
    path = "/stocks",
    tag = "stocks",
    params(StocksQuery),
    responses(
        (status = 200, description = "랭킹 페이지", body = StocksResponse),
        (status = 500, description = "서버 에러", body = ApiErrorResponse),
        (status = 503, description = "스냅샷 미준비", body = ApiErrorResponse)
    )
)]
pub async fn list_stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StocksQuery>,
) -> ApiResult<Json<StocksResponse>> {
    debug!(page = query.page, limit = query.limit, "랭킹 조회 요청");

    let mut snapshot = state.current_snapshot().await.map_err(into_api_error)?;

    // 저장소가 순서를 보존하지 않아도 견디도록 서빙 직전 재정렬
    snapshot.sort_descending();

    let page = query.page.max(1);
    let limit = query.limit.max(1);
    let (stocks, total_pages) = paginate(&snapshot.stocks, page, limit);

    Ok(Json(StocksResponse {
        stocks,
        total_pages,
        current_page: page,
    }))
}

/// Stocks 라우터 생성.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new().route("/stocks", get(list_stocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{create_test_state, sample_snapshot, today_marker};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn ranked(n: usize) -> Vec<RankedStock> {
        sample_snapshot(n).stocks
    }

    #[test]
    fn test_paginate_middle_page() {
        let stocks = ranked(250);
        let (page_slice, total_pages) = paginate(&stocks, 2, 100);

        assert_eq!(total_pages, 3);
        assert_eq!(page_slice.len(), 100);
        // [100, 200) 구간
        assert_eq!(page_slice[0].code, stocks[100].code);
        assert_eq!(page_slice[99].code, stocks[199].code);
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let stocks = ranked(250);
        let (page_slice, total_pages) = paginate(&stocks, 3, 100);

        assert_eq!(total_pages, 3);
        assert_eq!(page_slice.len(), 50);
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let stocks = ranked(10);
        let (page_slice, total_pages) = paginate(&stocks, 5, 10);

        assert_eq!(total_pages, 1);
        assert!(page_slice.is_empty());
    }

    #[test]
    fn test_paginate_empty_snapshot() {
        let (page_slice, total_pages) = paginate(&[], 1, 100);
        assert_eq!(total_pages, 0);
        assert!(page_slice.is_empty());
    }

    #[test]
    fn test_paginate_clamps_zero_inputs() {
        let stocks = ranked(5);
        let (page_slice, total_pages) = paginate(&stocks, 0, 0);
        // page/limit 0은 1로 클램프
        assert_eq!(total_pages, 5);
        assert_eq!(page_slice.len(), 1);
    }

    #[tokio::test]
    async fn test_stocks_route_serves_fresh_snapshot() {
        // 오늘자 마커 → 파이프라인 실행 없이 캐시 서빙
        let state = Arc::new(create_test_state(Some((
            sample_snapshot(7),
            today_marker(),
        ))));
        let app = stocks_router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stocks?page=2&limit=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed["current_page"], 2);
        assert_eq!(parsed["total_pages"], 3);
        assert_eq!(parsed["stocks"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stocks_route_serves_stale_snapshot_when_cycle_fails() {
        use crate::state::test_support::yesterday_marker;

        // 어제자 마커 → STALE → 테스트 파이프라인은 항상 실패 →
        // 직전 스냅샷으로 폴백해 200을 반환해야 함
        let state = Arc::new(create_test_state(Some((
            sample_snapshot(3),
            yesterday_marker(),
        ))));
        let app = stocks_router().with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/stocks").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stocks_route_errors_when_nothing_cached() {
        // 스냅샷도 없고 재계산도 실패 → 사이클 에러가 그대로 노출 (500)
        let state = Arc::new(create_test_state(None));
        let app = stocks_router().with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/stocks").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
