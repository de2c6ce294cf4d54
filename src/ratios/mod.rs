pub mod merge;
pub mod durable;
pub mod live;
pub mod reconciler;

pub use durable::DurableRatioCache;
pub use live::LiveRatioCache;
pub use reconciler::{RatioReconciler, ReconciledSnapshot};
