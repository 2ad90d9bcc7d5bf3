//! 도메인 모델.

pub mod price;
pub mod snapshot;

pub use price::*;
pub use snapshot::*;
