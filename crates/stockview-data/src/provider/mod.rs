//! 외부 데이터 제공자 클라이언트.

pub mod alpha;
pub mod logo;

pub use alpha::MarketDataClient;
pub use logo::{LogoResolver, LogoSource};
