use crate::model::{Commodity, FetchResult, ScraperError};

/// One upstream feed. Implementations fetch and decode, nothing more.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn commodity(&self) -> Commodity;
    async fn fetch(&self) -> Result<FetchResult, ScraperError>;
}
