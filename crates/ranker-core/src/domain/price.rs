//! 일별 종가 시계열.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 하루치 종가 관측값.
///
/// 시계열은 `Vec<DailyClose>`로 표현하며 과거 → 최신 순서를 유지합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClose {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: Decimal,
}

impl DailyClose {
    /// 새 관측값을 생성합니다.
    pub fn new(date: NaiveDate, close: Decimal) -> Self {
        Self { date, close }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_serde_roundtrip() {
        let obs = DailyClose::new(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), dec!(71500));
        let json = serde_json::to_string(&obs).unwrap();
        let parsed: DailyClose = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, obs);
    }
}
