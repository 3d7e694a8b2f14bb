//! 데이터 레이어 전반에서 사용되는 공통 타입.

mod resolution;
mod ticker;
mod timeseries;

pub use resolution::*;
pub use ticker::*;
pub use timeseries::*;
