//! 랭킹 스냅샷 및 갱신 마커.
//!
//! 사이클이 영속화하는 엔티티는 이 둘뿐입니다. 스냅샷은 매 사이클 통째로
//! 교체되며(부분 변경 없음), 마커는 마지막 성공 사이클의 KST 날짜/시각을
//! 담습니다.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 섹터를 알 수 없는 종목에 부여하는 라벨.
///
/// 센티널이지만 섹터 집계에는 다른 섹터와 동일하게 참여합니다.
pub const UNKNOWN_SECTOR: &str = "알 수 없음";

/// 스냅샷의 종목별 출력 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct RankedStock {
    /// 종목 코드 (6자리, 선행 0 유지)
    pub code: String,
    /// 종목명
    pub name: String,
    /// 종가
    pub close_price: Decimal,
    /// 상대강도 백분위 점수 (1~99, 소수 2자리)
    pub relative_strength_percentile: Decimal,
    /// 기간 최저가 대비 상승률 (예: "+12.34%")
    pub rally_from_low_pct: String,
    /// 기간 최고가 대비 하락률 (예: "-5.67%")
    pub drawdown_from_high_pct: String,
    /// 섹터명
    pub sector: String,
    /// 시가총액 (억 단위 표기, 예: "4120억")
    pub market_cap: String,
    /// 섹터 수익률 순위 라벨 (예: "섹터 수익률 3위")
    pub sector_rank_label: String,
}

/// 한 사이클의 전체 랭킹 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSnapshot {
    /// 계산 완료 시각 (UTC)
    pub computed_at: DateTime<Utc>,
    /// 백분위 점수 내림차순으로 정렬된 레코드
    pub stocks: Vec<RankedStock>,
}

impl RankedSnapshot {
    /// 레코드 수.
    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    /// 레코드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// 백분위 점수 내림차순(동점 시 코드 오름차순)으로 재정렬합니다.
    ///
    /// 파이프라인이 이미 정렬해서 저장하지만, 저장소가 순서를 보존하지
    /// 않는 경우를 견디기 위해 서빙 직전에 한 번 더 정렬합니다.
    pub fn sort_descending(&mut self) {
        self.stocks.sort_by(|a, b| {
            b.relative_strength_percentile
                .cmp(&a.relative_strength_percentile)
                .then_with(|| a.code.cmp(&b.code))
        });
    }
}

/// 마지막 성공 사이클 마커.
///
/// 매 성공 사이클마다 덮어쓰며 삭제하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMarker {
    /// 계산 완료 KST 날짜
    pub date: NaiveDate,
    /// 계산 완료 KST 시각
    pub time: NaiveTime,
}

impl UpdateMarker {
    /// 새 마커를 생성합니다.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

/// 시가총액을 억 단위 문자열로 변환합니다.
///
/// 원 단위 값을 1e8로 나눠 반올림한 정수에 "억"을 붙입니다.
pub fn format_market_cap(value: Decimal) -> String {
    let eok = (value / dec!(100_000_000)).round();
    format!("{}억", eok)
}

/// 상승률을 부호 포함 백분율 문자열로 변환합니다 (예: "+12.34%").
pub fn format_rally_pct(value: Decimal) -> String {
    format!("+{:.2}%", value.round_dp(2))
}

/// 하락률을 부호 포함 백분율 문자열로 변환합니다 (예: "-5.67%").
///
/// 입력은 양수로 표현된 하락 폭입니다.
pub fn format_drawdown_pct(value: Decimal) -> String {
    format!("-{:.2}%", value.round_dp(2))
}

/// 섹터 순위 라벨을 만듭니다.
pub fn sector_rank_label(rank: u32) -> String {
    format!("섹터 수익률 {}위", rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_market_cap() {
        // 500억 경계값
        assert_eq!(format_market_cap(dec!(50_000_000_000)), "500억");
        // 반올림 (Decimal::round는 은행가 반올림, 원본 구현의 round와 동일)
        assert_eq!(format_market_cap(dec!(50_049_999_999)), "500억");
        assert_eq!(format_market_cap(dec!(50_060_000_000)), "501억");
        assert_eq!(format_market_cap(dec!(0)), "0억");
    }

    #[test]
    fn test_format_percentages() {
        assert_eq!(format_rally_pct(dec!(12.346)), "+12.35%");
        assert_eq!(format_rally_pct(dec!(0)), "+0.00%");
        assert_eq!(format_drawdown_pct(dec!(5.666)), "-5.67%");
        assert_eq!(format_drawdown_pct(dec!(0)), "-0.00%");
    }

    #[test]
    fn test_sector_rank_label() {
        assert_eq!(sector_rank_label(1), "섹터 수익률 1위");
        assert_eq!(sector_rank_label(10), "섹터 수익률 10위");
    }

    #[test]
    fn test_snapshot_sort_descending() {
        let stock = |code: &str, pct: Decimal| RankedStock {
            code: code.to_string(),
            name: "테스트".to_string(),
            close_price: dec!(10000),
            relative_strength_percentile: pct,
            rally_from_low_pct: "+1.00%".to_string(),
            drawdown_from_high_pct: "-1.00%".to_string(),
            sector: UNKNOWN_SECTOR.to_string(),
            market_cap: "600억".to_string(),
            sector_rank_label: sector_rank_label(1),
        };

        let mut snapshot = RankedSnapshot {
            computed_at: Utc::now(),
            stocks: vec![
                stock("000020", dec!(34.00)),
                stock("000070", dec!(99.00)),
                stock("000050", dec!(34.00)),
            ],
        };
        snapshot.sort_descending();

        let codes: Vec<&str> = snapshot.stocks.iter().map(|s| s.code.as_str()).collect();
        // 동점(34.00)은 코드 오름차순
        assert_eq!(codes, vec!["000070", "000020", "000050"]);
    }
}
