//! 상대강도 랭킹 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 기동 시 백그라운드에서 스냅샷을 예열하고, 이후 읽기 요청은 신선도
//! 게이트를 거쳐 캐시 또는 재계산 결과를 서빙합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use ranker_analytics::{FreshnessGate, PipelineContext, RankingPipeline};
use ranker_api::openapi::swagger_ui_router;
use ranker_api::routes::create_api_router;
use ranker_api::state::AppState;
use ranker_core::{init_logging_from_env, AppConfig};
use ranker_data::{KrxClient, RedisStore, RedisStoreConfig, SnapshotStore, WicsSectorClient};

/// 서버 바인딩 설정.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
}

impl ServerConfig {
    /// 설정 파일 값 위에 환경 변수(API_HOST, API_PORT)를 덮어씁니다.
    fn resolve(config: &AppConfig) -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| config.server.host.clone());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(config.server.port);

        Self { host, port }
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 모든 origin을 허용합니다 (이 API는 인증이 없는
/// 읽기 전용 서비스입니다).
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            info!("CORS_ORIGINS not set, allowing any origin");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(create_api_router().with_state(state))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃: stale 요청이 사이클을 인라인으로 실행하면
        // 수십 초가 걸릴 수 있으므로 여유 있게 잡습니다
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(120),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    init_logging_from_env()?;

    info!("Starting RS Ranker API server...");

    // 설정 로드 (config/default.toml이 없으면 기본값)
    let config = AppConfig::load_or_default();
    let server = ServerConfig::resolve(&config);
    let addr = server.socket_addr().map_err(|e| {
        tracing::error!(
            host = %server.host,
            port = server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // KRX API 키 (필수)
    let krx = KrxClient::from_env()
        .ok_or("KRX_API_KEY 환경변수가 설정되지 않았습니다")?;

    // Redis 스냅샷 저장소 연결 (REDIS_URL 환경변수 우선)
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| config.redis.url.clone());
    let redis = Arc::new(
        RedisStore::connect(&RedisStoreConfig { url: redis_url }).await?,
    );
    let store: Arc<dyn SnapshotStore> = Arc::clone(&redis) as Arc<dyn SnapshotStore>;

    // 파이프라인 구성
    let pipeline = RankingPipeline::new(PipelineContext {
        market_data: Arc::new(krx),
        sectors: Arc::new(WicsSectorClient::new()),
        store: Arc::clone(&store),
        config: config.pipeline.clone(),
    });

    // 신선도 게이트 (마감 후 재계산 기준 시각 포함)
    let gate = FreshnessGate::new(config.pipeline.cutoff_time());

    let state = Arc::new(AppState::new(store, Some(redis), pipeline, gate));

    info!(version = %state.version, "Application state initialized");

    // 스냅샷 예열: 첫 읽기 요청이 사이클 비용을 지불하지 않도록
    // 백그라운드에서 게이트 + 파이프라인을 한 번 돌립니다
    let warmup_state = Arc::clone(&state);
    tokio::spawn(async move {
        match warmup_state.current_snapshot().await {
            Ok(snapshot) => info!(stocks = snapshot.len(), "초기 스냅샷 준비 완료"),
            Err(e) => warn!(error = %e, "초기 스냅샷 준비 실패, 읽기 요청 시 재시도"),
        }
    });

    // 라우터 생성 및 서버 시작
    let app = create_router(state);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 서버를 종료합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
