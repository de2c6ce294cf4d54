pub mod cache;
pub mod cross_rate;

pub use cache::{CachedPriceEntry, PriceSeriesCache};
pub use cross_rate::compute_cross_rate;
