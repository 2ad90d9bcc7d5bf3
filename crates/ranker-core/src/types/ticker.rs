//! 종목 코드 및 시장 유형 정의.
//!
//! 이 모듈은 한국 주식 종목 관련 타입을 정의합니다:
//! - `Market` - 시장 구분 (KOSPI, KOSDAQ)
//! - `TickerCode` - 6자리 단축코드

use serde::{Deserialize, Serialize};
use std::fmt;

/// 시장 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    /// 유가증권시장 (코스피)
    Kospi,
    /// 코스닥
    Kosdaq,
}

impl Market {
    /// 두 시장 전체.
    pub const ALL: [Market; 2] = [Market::Kospi, Market::Kosdaq];
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Kospi => write!(f, "KOSPI"),
            Market::Kosdaq => write!(f, "KOSDAQ"),
        }
    }
}

/// 6자리 단축코드.
///
/// 항상 0으로 채워진 6자리 문자열로 유지합니다.
/// 숫자로 변환하면 선행 0이 사라지므로 (예: "005930" → 5930)
/// 코드 전체를 문자열로 다룹니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerCode(String);

impl TickerCode {
    /// 새 종목 코드를 생성합니다. 6자리 미만이면 앞을 0으로 채웁니다.
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self(format!("{:0>6}", code.trim()))
    }

    /// 보통주 여부를 확인합니다.
    ///
    /// 단축코드의 끝자리가 0이 아니면 우선주/전환주 계열입니다.
    pub fn is_common_share(&self) -> bool {
        self.0.ends_with('0')
    }

    /// 코드 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TickerCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
