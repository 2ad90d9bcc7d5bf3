//! 스냅샷 저장소.

pub mod redis;

use crate::Result;
use async_trait::async_trait;
use ranker_core::{RankedSnapshot, UpdateMarker};

/// 랭킹 스냅샷과 갱신 마커의 영속화 계약.
///
/// 단일 기록자 / 다중 독자 계약: 쓰기는 파이프라인 사이클 하나만 수행하고,
/// 읽기는 언제든 허용됩니다. `replace`는 스냅샷과 마커를 한 번에 원자적으로
/// 교체해야 하며, 독자는 절대 반쯤 쓰인 스냅샷을 관찰할 수 없습니다.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 현재 스냅샷 조회. 없으면 None.
    async fn snapshot(&self) -> Result<Option<RankedSnapshot>>;

    /// 스냅샷과 마커를 원자적으로 교체합니다.
    async fn replace(&self, snapshot: &RankedSnapshot, marker: &UpdateMarker) -> Result<()>;

    /// 마지막 갱신 마커 조회. 없으면 None.
    async fn marker(&self) -> Result<Option<UpdateMarker>>;
}
