//! KRX Open API 클라이언트.
//!
//! 한국거래소(KRX) Open API를 통해 주식 데이터를 수집합니다.
//!
//! # 지원 데이터
//!
//! - 시장별 종목 유니버스 (일별 매매정보)
//! - 개별 종목 일별 종가
//! - 전종목 시가총액
//! - 종목명
//!
//! # API 키 관리
//!
//! KRX API 키는 환경변수 `KRX_API_KEY`에서 읽습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use ranker_data::provider::krx::KrxClient;
//!
//! let client = KrxClient::from_env().expect("KRX_API_KEY not set");
//! let tickers = client.list_tickers(Market::Kospi).await?;
//! ```

use crate::error::{DataError, Result};
use crate::provider::MarketDataProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use ranker_core::{DailyClose, Market, TickerCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// API 응답 래퍼.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(rename = "OutBlock_1")]
    out_block: Option<Vec<T>>,
}

/// 일별 매매정보 행 (유니버스/시가총액/종목명의 공통 소스).
#[derive(Debug, Deserialize)]
struct RawDailyTrade {
    #[serde(rename = "ISU_SRT_CD")]
    ticker: String,
    #[serde(rename = "ISU_ABBRV")]
    name: String,
    #[serde(rename = "TDD_CLSPRC", default)]
    close: Option<String>,
    #[serde(rename = "MKTCAP", default)]
    market_cap: Option<String>,
}

/// 개별 종목 일별 시세 행.
#[derive(Debug, Deserialize)]
struct RawOhlcv {
    #[serde(rename = "TRD_DD")]
    date: String,
    #[serde(rename = "TDD_CLSPRC", default)]
    close: Option<String>,
}

/// KRX Open API 클라이언트.
///
/// 순수 I/O 어댑터입니다. 비즈니스 로직 없이 응답을 도메인 타입으로
/// 변환만 합니다.
pub struct KrxClient {
    client: reqwest::Client,
    auth_key: String,
    base_url: String,
    /// 종목명 캐시: (기준일, 코드 → 종목명).
    ///
    /// 단일 기록자 계약: 같은 기준일에 대해 여러 태스크가 동시에 채워도
    /// 동일한 테이블을 쓰므로 마지막 기록이 이겨도 무해합니다.
    name_cache: RwLock<Option<(String, HashMap<String, String>)>>,
}

impl KrxClient {
    /// 새로운 KRX API 클라이언트 생성.
    ///
    /// # Arguments
    /// * `auth_key` - KRX Open API 인증키
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            auth_key: auth_key.into(),
            base_url: "https://data-dbg.krx.co.kr".to_string(),
            name_cache: RwLock::new(None),
        }
    }

    /// 환경변수 `KRX_API_KEY`에서 인증키를 로드하여 클라이언트 생성.
    pub fn from_env() -> Option<Self> {
        std::env::var("KRX_API_KEY").ok().map(Self::new)
    }

    /// 테스트용 base URL 오버라이드.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// API 요청 실행.
    ///
    /// AUTH_KEY는 HTTP 헤더로 전달합니다 (KRX Open API 명세 준수).
    async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        api_id: &str,
        params: &HashMap<&str, &str>,
    ) -> Result<Vec<T>> {
        let url = format!("{}/svc/sample/apis/stk/{}", self.base_url, api_id);

        tracing::debug!(api_id = api_id, url = %url, "KRX API 요청");

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("AUTH_KEY", &self.auth_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "KRX API 오류 [{}]: {} - {}",
                api_id, status, body
            )));
        }

        let data: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        Ok(data.out_block.unwrap_or_default())
    }

    /// 시장별 일별 매매정보 API ID.
    fn daily_trade_api_id(market: Market) -> &'static str {
        match market {
            Market::Kospi => "stk_bydd_trd",
            Market::Kosdaq => "ksq_bydd_trd",
        }
    }

    /// 시장별 일별 매매정보 조회.
    async fn fetch_daily_trades(
        &self,
        market: Market,
        base_date: &str,
    ) -> Result<Vec<RawDailyTrade>> {
        let params: HashMap<&str, &str> = [("basDd", base_date)].into_iter().collect();
        let rows: Vec<RawDailyTrade> =
            self.request(Self::daily_trade_api_id(market), &params).await?;

        tracing::debug!(market = %market, count = rows.len(), "일별 매매정보 조회 완료");
        Ok(rows)
    }

    /// 기준일의 전종목 (코드 → 종목명) 테이블을 캐시에 채웁니다.
    async fn ensure_name_table(&self, base_date: &str) -> Result<()> {
        {
            let cache = self.name_cache.read().await;
            if let Some((cached_date, _)) = cache.as_ref() {
                if cached_date == base_date {
                    return Ok(());
                }
            }
        }

        let mut table = HashMap::new();
        for market in Market::ALL {
            for row in self.fetch_daily_trades(market, base_date).await? {
                table.insert(TickerCode::new(row.ticker).as_str().to_string(), row.name);
            }
        }

        tracing::info!(count = table.len(), base_date = base_date, "종목명 테이블 갱신");
        *self.name_cache.write().await = Some((base_date.to_string(), table));
        Ok(())
    }

    /// 조회 기준일 (마지막 완결 거래 세션).
    ///
    /// 당일 장중에는 당일 데이터가 비어 있으므로 전일을 사용합니다.
    fn base_date() -> String {
        (ranker_core::kst_today() - chrono::Duration::days(1))
            .format("%Y%m%d")
            .to_string()
    }
}

#[async_trait]
impl MarketDataProvider for KrxClient {
    async fn list_tickers(&self, market: Market) -> Result<Vec<TickerCode>> {
        let base_date = Self::base_date();
        let rows = self.fetch_daily_trades(market, &base_date).await?;

        let tickers: Vec<TickerCode> =
            rows.into_iter().map(|r| TickerCode::new(r.ticker)).collect();

        tracing::info!(market = %market, count = tickers.len(), "종목 유니버스 조회 완료");
        Ok(tickers)
    }

    async fn daily_closes(
        &self,
        code: &TickerCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        let start_str = start.format("%Y%m%d").to_string();
        let end_str = end.format("%Y%m%d").to_string();
        let params: HashMap<&str, &str> = [
            ("isuCd", code.as_str()),
            ("strtDd", start_str.as_str()),
            ("endDd", end_str.as_str()),
        ]
        .into_iter()
        .collect();

        let rows: Vec<RawOhlcv> = self.request("stk_isu_ohlcv", &params).await?;

        let mut closes: Vec<DailyClose> = rows
            .into_iter()
            .filter_map(|o| {
                let date = NaiveDate::parse_from_str(&o.date, "%Y/%m/%d").ok()?;
                let close = parse_decimal_opt(&o.close)?;
                Some(DailyClose::new(date, close))
            })
            .collect();

        // 응답 순서를 믿지 않고 날짜 오름차순으로 정렬
        closes.sort_by_key(|c| c.date);
        Ok(closes)
    }

    async fn market_caps(&self, as_of: NaiveDate) -> Result<HashMap<TickerCode, Decimal>> {
        let base_date = as_of.format("%Y%m%d").to_string();

        let mut caps = HashMap::new();
        for market in Market::ALL {
            for row in self.fetch_daily_trades(market, &base_date).await? {
                if let Some(cap) = parse_decimal_opt(&row.market_cap) {
                    caps.insert(TickerCode::new(row.ticker), cap);
                }
            }
        }

        tracing::info!(count = caps.len(), "시가총액 테이블 조회 완료");
        Ok(caps)
    }

    async fn name(&self, code: &TickerCode) -> Result<String> {
        let base_date = Self::base_date();
        self.ensure_name_table(&base_date).await?;

        let cache = self.name_cache.read().await;
        cache
            .as_ref()
            .and_then(|(_, table)| table.get(code.as_str()).cloned())
            .ok_or_else(|| DataError::NotFound(format!("종목명 없음: {}", code)))
    }
}

/// 쉼표 구분 숫자 문자열 파싱 ("1,234.56" → 1234.56).
fn parse_decimal_opt(s: &Option<String>) -> Option<Decimal> {
    s.as_ref().and_then(|v| {
        let cleaned = v.replace(",", "").replace("%", "");
        cleaned.parse().ok()
    })
}
