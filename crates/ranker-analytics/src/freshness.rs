//! 캐시 신선도 판정 게이트.
//!
//! 저장된 스냅샷이 현재 거래일에 유효한지 판정하는 두 상태의 상태 기계입니다.
//! STALE → FRESH 전이는 파이프라인 사이클이 성공해 마커를 갱신했을 때만
//! 일어납니다.
//!
//! # 정책
//!
//! - 마커 없음 → STALE
//! - 마커 날짜 ≠ 오늘 (KST) → STALE
//! - 마커 날짜 = 오늘 → FRESH. 단, 마감 기준 시각(cutoff)이 설정되어 있고
//!   현재 시각이 기준을 지났는데 마커가 기준 이전(장중)에 기록되었다면
//!   STALE — 장중에 만든 스냅샷을 마감 후 정확히 한 번 다시 계산합니다.
//!
//! 모든 날짜/시각 비교는 KST 기준입니다. 호출자가 `kst_now()`를 넘기므로
//! 게이트 자체는 호스트 시간대에 의존하지 않습니다.

use chrono::{DateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use ranker_core::UpdateMarker;

/// 신선도 판정 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// 캐시된 스냅샷 서빙 가능
    Fresh,
    /// 재계산 필요
    Stale,
}

/// 신선도 게이트.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessGate {
    /// 장 마감 후 재계산 기준 시각 (KST). None이면 날짜 비교만 수행.
    cutoff: Option<NaiveTime>,
}

impl FreshnessGate {
    /// 새 게이트를 생성합니다.
    pub fn new(cutoff: Option<NaiveTime>) -> Self {
        Self { cutoff }
    }

    /// 마커와 현재 KST 시각으로 신선도를 판정합니다.
    pub fn evaluate(&self, marker: Option<&UpdateMarker>, now: DateTime<Tz>) -> Freshness {
        let Some(marker) = marker else {
            return Freshness::Stale;
        };

        if marker.date != now.date_naive() {
            return Freshness::Stale;
        }

        if let Some(cutoff) = self.cutoff {
            // 초 단위 절삭: 마커는 분 해상도면 충분
            let now_time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());
            if now_time >= cutoff && marker.time < cutoff {
                return Freshness::Stale;
            }
        }

        Freshness::Fresh
    }

    /// 재계산이 필요한지 편의 판정.
    pub fn is_stale(&self, marker: Option<&UpdateMarker>, now: DateTime<Tz>) -> bool {
        self.evaluate(marker, now) == Freshness::Stale
    }
}
