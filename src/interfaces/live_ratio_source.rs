use async_trait::async_trait;
use crate::error::Result;
use crate::types::LiveRatioSnapshot;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiveRatioSource: Send + Sync {
    async fn fetch_live(&self) -> Result<LiveRatioSnapshot>;
}
