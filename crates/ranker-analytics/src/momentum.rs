//! 모멘텀 점수 계산기.
//!
//! 1년치 일별 종가 시계열에서 상대강도 원점수를 계산합니다.
//!
//! # 계산 공식
//!
//! 최신 관측을 기준으로 {-1, -10, -21, -63, -126} 지점의 종가 비율 네 개를
//! 구하고, 최근 2주 비율에 2배 가중치를 둡니다:
//!
//! - ratio₁ = close[-1] / close[-10]
//! - ratio₂ = close[-10] / close[-21]
//! - ratio₃ = close[-21] / close[-63]
//! - ratio₄ = close[-63] / close[-126]
//! - 원점수 = 2·ratio₁ + ratio₂ + ratio₃ + ratio₄
//!
//! 보조 지표로 기간 최저가 대비 상승률과 기간 최고가 대비 하락률을
//! 함께 반환합니다.

use ranker_core::DailyClose;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 점수 계산에 필요한 최소 거래일 관측 수.
///
/// 가장 먼 앵커(-126)가 요구하는 길이와 같습니다.
pub const MIN_OBSERVATIONS: usize = 126;

/// 종목 하나의 모멘텀 점수 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumScore {
    /// 원점수 (상한 없는 양수)
    pub total_score: Decimal,
    /// 최신 종가
    pub close: Decimal,
    /// 기간 최저가 대비 상승률 (%)
    pub rally_from_low_pct: Decimal,
    /// 기간 최고가 대비 하락률 (%)
    pub drawdown_from_high_pct: Decimal,
}

/// 종가 시계열에서 모멘텀 점수를 계산합니다. 순수 함수입니다.
///
/// # 반환
///
/// 관측 수가 `min_observations`(및 앵커가 요구하는 126) 미만이거나,
/// 비율 분모 또는 기간 최저/최고가가 0인 퇴화 시계열이면 `None`
/// (부적격)을 반환합니다. 파이프라인은 부적격 종목을 건너뛰며 사이클을
/// 중단하지 않습니다.
pub fn score_series(closes: &[DailyClose], min_observations: usize) -> Option<MomentumScore> {
    let required = min_observations.max(MIN_OBSERVATIONS);
    if closes.len() < required {
        return None;
    }

    let len = closes.len();
    let at = |offset: usize| closes[len - offset].close;

    let latest = at(1);
    let two_weeks = at(10);
    let one_month = at(21);
    let three_months = at(63);
    let six_months = at(126);

    // 퇴화 시계열 (0 분모) 방어
    if two_weeks.is_zero()
        || one_month.is_zero()
        || three_months.is_zero()
        || six_months.is_zero()
    {
        return None;
    }

    let ratio_1 = latest / two_weeks;
    let ratio_2 = two_weeks / one_month;
    let ratio_3 = one_month / three_months;
    let ratio_4 = three_months / six_months;

    // 최근 2주 비율의 2배 가중은 의도된 recency bias
    let total_score = ratio_1 * dec!(2) + ratio_2 + ratio_3 + ratio_4;

    let lowest = closes.iter().map(|c| c.close).min()?;
    let highest = closes.iter().map(|c| c.close).max()?;
    if lowest.is_zero() || highest.is_zero() {
        return None;
    }

    let rally_from_low_pct = (latest - lowest) / lowest * dec!(100);
    let drawdown_from_high_pct = (highest - latest) / highest * dec!(100);

    Some(MomentumScore {
        total_score,
        close: latest,
        rally_from_low_pct,
        drawdown_from_high_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(prices: &[Decimal]) -> Vec<DailyClose> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyClose::new(start + chrono::Duration::days(i as i64), close))
            .collect()
    }

    #[test]
    fn test_insufficient_history_is_ineligible() {
        let prices: Vec<Decimal> = (0..125).map(|_| dec!(100)).collect();
        assert!(score_series(&series(&prices), MIN_OBSERVATIONS).is_none());
    }

    #[test]
    fn test_exactly_126_observations_is_eligible() {
        let prices: Vec<Decimal> = (0..126).map(|_| dec!(100)).collect();
        let score = score_series(&series(&prices), MIN_OBSERVATIONS).unwrap();

        // 일정한 가격: 비율 전부 1, 원점수 = 2+1+1+1 = 5
        assert_eq!(score.total_score, dec!(5));
        assert_eq!(score.close, dec!(100));
        assert_eq!(score.rally_from_low_pct, dec!(0));
        assert_eq!(score.drawdown_from_high_pct, dec!(0));
    }

    #[test]
    fn test_known_anchor_ratios() {
        // 마지막 126개 관측의 앵커 지점만 가격을 다르게 배치
        let mut prices: Vec<Decimal> = (0..200).map(|_| dec!(100)).collect();
        let len = prices.len();
        prices[len - 1] = dec!(120); // close[-1]
        prices[len - 10] = dec!(100); // close[-10]
        prices[len - 21] = dec!(80); // close[-21]
        prices[len - 63] = dec!(80); // close[-63]
        prices[len - 126] = dec!(64); // close[-126]

        let score = score_series(&series(&prices), MIN_OBSERVATIONS).unwrap();

        // ratio₁=1.2, ratio₂=1.25, ratio₃=1, ratio₄=1.25
        // 원점수 = 2·1.2 + 1.25 + 1 + 1.25 = 5.9
        assert_eq!(score.total_score, dec!(5.9));
        // 최저 64 대비 120: +87.5%
        assert_eq!(score.rally_from_low_pct, dec!(87.5));
        // 최고 120이 최신이므로 하락률 0
        assert_eq!(score.drawdown_from_high_pct, dec!(0));
    }

    #[test]
    fn test_ratios_strictly_positive_for_positive_series() {
        let prices: Vec<Decimal> = (1..=150).map(|i| Decimal::from(i * 10)).collect();
        let score = score_series(&series(&prices), MIN_OBSERVATIONS).unwrap();
        assert!(score.total_score > Decimal::ZERO);
    }

    #[test]
    fn test_degenerate_zero_close_is_ineligible() {
        let mut prices: Vec<Decimal> = (0..150).map(|_| dec!(100)).collect();
        let len = prices.len();
        prices[len - 21] = Decimal::ZERO;
        assert!(score_series(&series(&prices), MIN_OBSERVATIONS).is_none());
    }

    #[test]
    fn test_drawdown_from_high() {
        let mut prices: Vec<Decimal> = (0..150).map(|_| dec!(100)).collect();
        let len = prices.len();
        prices[len - 50] = dec!(200); // 기간 최고가
        prices[len - 1] = dec!(150); // 최신 종가

        let score = score_series(&series(&prices), MIN_OBSERVATIONS).unwrap();
        // (200 - 150) / 200 × 100 = 25%
        assert_eq!(score.drawdown_from_high_pct, dec!(25));
        // (150 - 100) / 100 × 100 = 50%
        assert_eq!(score.rally_from_low_pct, dec!(50));
    }
}
