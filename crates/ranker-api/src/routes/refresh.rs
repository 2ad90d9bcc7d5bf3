//! 수동 재계산 라우트.
//!
//! `GET /refresh` — 신선도 게이트를 거치지 않고 즉시 전체 사이클을
//! 실행합니다. 사이클 실패는 호출자에게 서버 에러로 전달되며, 이 경우
//! 직전 스냅샷이 계속 유효합니다.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 재계산 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    /// 처리 상태
    pub status: String,
    /// 스냅샷에 포함된 종목 수
    pub stocks: usize,
    /// 소요 시간 (밀리초)
    pub elapsed_ms: u64,
    /// 계산 완료 시각 (ISO 8601)
    pub computed_at: String,
}

/// GET /refresh - 즉시 전체 사이클 실행.
#[utoipa::path(
    get,
    path = "/refresh",
    tag = "refresh",
    responses(
        (status = 200, description = "재계산 완료", body = RefreshResponse),
        (status = 500, description = "사이클 실패", body = ApiErrorResponse)
    )
)]
pub async fn run_refresh(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshResponse>> {
    let started = Instant::now();
    info!("수동 재계산 요청 수신");

    let snapshot = state.force_refresh().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new("CYCLE_FAILED", e.to_string())),
        )
    })?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(stocks = snapshot.len(), elapsed_ms = elapsed_ms, "수동 재계산 완료");

    Ok(Json(RefreshResponse {
        status: "ok".to_string(),
        stocks: snapshot.len(),
        elapsed_ms,
        computed_at: snapshot.computed_at.to_rfc3339(),
    }))
}

/// Refresh 라우터 생성.
pub fn refresh_router() -> Router<Arc<AppState>> {
    Router::new().route("/refresh", get(run_refresh))
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

    #[tokio::test]
    async fn test_refresh_failure_returns_500() {
        // 테스트 파이프라인의 제공자는 항상 실패하므로 강제 재계산은 500
        let state = Arc::new(create_test_state(Some((
            sample_snapshot(3),
            today_marker(),
        ))));
        let app = refresh_router().with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "CYCLE_FAILED");
    }
}
