//! WICS 섹터 분류 크롤러.
//!
//! WISE 인덱스 구성종목 조회 엔드포인트에서 섹터별 구성 종목을 수집합니다.
//! 섹터 코드는 고정된 열 개의 대분류(G10~G55)이며, 각 코드마다 한 번씩
//! 호출합니다. 개별 호출 실패는 상위에서 허용됩니다 — 매핑되지 않은
//! 종목은 "알 수 없음" 섹터로 남습니다.

use crate::error::{DataError, Result};
use crate::provider::SectorProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use ranker_core::TickerCode;
use serde::Deserialize;
use std::time::Duration;

/// WICS 대분류 섹터 코드 전체.
pub const WICS_SECTOR_CODES: [&str; 10] = [
    "G25", "G35", "G50", "G40", "G10", "G20", "G55", "G30", "G15", "G45",
];

/// 구성종목 응답.
#[derive(Debug, Deserialize)]
struct ComponentsResponse {
    #[serde(rename = "list", default)]
    list: Vec<RawComponent>,
}

/// 구성종목 행.
#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(rename = "CMP_CD")]
    code: String,
    #[serde(rename = "SEC_NM_KOR")]
    sector_name: String,
}

/// WICS 섹터 크롤러.
pub struct WicsSectorClient {
    client: reqwest::Client,
    base_url: String,
    /// 요청 간 딜레이 (기본: 200ms)
    request_delay: Duration,
}

impl Default for WicsSectorClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WicsSectorClient {
    /// 기본 설정으로 생성.
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(200))
    }

    /// 커스텀 딜레이로 생성.
    pub fn with_delay(request_delay: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            base_url: "http://www.wiseindex.com".to_string(),
            request_delay,
        }
    }

    /// 테스트용 base URL 오버라이드.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 요청 딜레이 반환.
    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }
}

#[async_trait]
impl SectorProvider for WicsSectorClient {
    async fn sector_components(
        &self,
        sector_code: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<(TickerCode, String)>> {
        // 섹터 10개를 워커 풀로 돌리므로 호출마다 짧은 딜레이로 서버 부하 완화
        tokio::time::sleep(self.request_delay).await;

        let url = format!(
            "{}/Index/GetIndexComponets?ceil_yn=0&dt={}&sec_cd={}",
            self.base_url,
            as_of.format("%Y%m%d"),
            sector_code
        );

        tracing::debug!(sector_code = sector_code, "WICS 구성종목 요청");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::FetchError(format!(
                "WICS 응답 오류 [{}]: {}",
                sector_code,
                response.status()
            )));
        }

        let data: ComponentsResponse = response
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let components: Vec<(TickerCode, String)> = data
            .list
            .into_iter()
            .map(|c| (TickerCode::new(c.code), c.sector_name))
            .collect();

        tracing::debug!(
            sector_code = sector_code,
            count = components.len(),
            "WICS 구성종목 수신"
        );
        Ok(components)
    }

    fn sector_codes(&self) -> &[&'static str] {
        &WICS_SECTOR_CODES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sector_components_parsing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/Index/GetIndexComponets")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"list":[
                    {"CMP_CD":"005930","SEC_NM_KOR":"IT"},
                    {"CMP_CD":"000660","SEC_NM_KOR":"IT"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = WicsSectorClient::new().with_base_url(server.url());
        let components = client
            .sector_components("G45", NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
            .await
            .unwrap();

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].0.as_str(), "005930");
        assert_eq!(components[0].1, "IT");
    }

    #[tokio::test]
    async fn test_empty_list_field_tolerated() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/Index/GetIndexComponets")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let client = WicsSectorClient::new().with_base_url(server.url());
        let components = client
            .sector_components("G45", NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
            .await
            .unwrap();

        assert!(components.is_empty());
    }

    #[test]
    fn test_sector_code_set_is_complete() {
        let client = WicsSectorClient::new();
        assert_eq!(client.sector_codes().len(), 10);
        assert!(client.sector_codes().contains(&"G45"));
    }
}
