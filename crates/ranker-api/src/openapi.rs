//! OpenAPI 문서 및 Swagger UI.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{RefreshResponse, StocksResponse};
use ranker_core::RankedStock;

/// OpenAPI 문서 정의.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RS Ranker API",
        description = "KOSPI/KOSDAQ 상대강도 랭킹 API"
    ),
    paths(
        crate::routes::stocks::list_stocks,
        crate::routes::refresh::run_refresh,
    ),
    components(schemas(
        RankedStock,
        StocksResponse,
        RefreshResponse,
        ApiErrorResponse,
    )),
    tags(
        (name = "stocks", description = "상대강도 랭킹 조회"),
        (name = "refresh", description = "수동 재계산")
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
pub fn swagger_ui_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
