pub mod blob_store;
pub mod live_ratio_source;
pub mod price_history_source;

pub use blob_store::BlobStore;
pub use live_ratio_source::LiveRatioSource;
pub use price_history_source::{HistoryWindow, PriceHistorySource};
