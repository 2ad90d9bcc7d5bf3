//! 한국 거래소 시간대(KST) 헬퍼.
//!
//! 신선도 판정과 거래일 계산은 전부 거래소 현지 시간 기준입니다.
//! 호스트 프로세스의 시간대 설정에 의존하면 해외 배포 시 날짜가 어긋나므로
//! 항상 `Asia/Seoul`로 변환해서 비교합니다.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Seoul;
use chrono_tz::Tz;

/// 현재 KST 시각.
pub fn kst_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Seoul)
}

/// 오늘의 KST 달력 날짜.
pub fn kst_today() -> NaiveDate {
    kst_now().date_naive()
}

/// 임의의 UTC 시각을 KST로 변환합니다.
pub fn to_kst(utc: DateTime<Utc>) -> DateTime<Tz> {
    utc.with_timezone(&Seoul)
}
