//! 외부 데이터 제공자.
//!
//! 랭킹 파이프라인은 구체 클라이언트가 아니라 이 모듈의 트레이트만
//! 소비합니다. 테스트에서는 트레이트를 구현한 목 제공자를 주입합니다.

pub mod krx;
pub mod wics;

pub use krx::KrxClient;
pub use wics::{WicsSectorClient, WICS_SECTOR_CODES};

use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use ranker_core::{DailyClose, Market, TickerCode};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// 시세/메타데이터 제공자.
///
/// 종목 유니버스, 일별 종가, 시가총액, 종목명을 제공합니다.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 시장의 전체 종목 코드 목록.
    async fn list_tickers(&self, market: Market) -> Result<Vec<TickerCode>>;

    /// 개별 종목의 일별 종가 시계열 (과거 → 최신 순).
    async fn daily_closes(
        &self,
        code: &TickerCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>>;

    /// 기준일의 전종목 시가총액 (원 단위).
    async fn market_caps(&self, as_of: NaiveDate) -> Result<HashMap<TickerCode, Decimal>>;

    /// 종목명 조회.
    async fn name(&self, code: &TickerCode) -> Result<String>;
}

/// 섹터 분류 제공자.
#[async_trait]
pub trait SectorProvider: Send + Sync {
    /// 섹터 지수의 구성 종목 목록: (종목코드, 섹터명).
    async fn sector_components(
        &self,
        sector_code: &str,
        as_of: NaiveDate,
    ) -> Result<Vec<(TickerCode, String)>>;

    /// 크롤링할 섹터 코드의 고정 목록.
    fn sector_codes(&self) -> &[&'static str];
}
