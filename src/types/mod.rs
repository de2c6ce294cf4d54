pub mod price;
pub mod ratio;
pub mod timestamp;

pub use price::{PricePoint, PriceSeries};
pub use ratio::{AssetRatioSeries, DailyRatio, LiveRatioSnapshot, SENTINEL_RATIO};
