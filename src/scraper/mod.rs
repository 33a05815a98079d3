// Scraper module: HTTP access to the upstream price feeds.

pub mod fetcher;
pub mod lme;
pub mod oilprice;
pub mod traits;

pub use fetcher::build_client;
pub use lme::LmeSource;
pub use oilprice::OilPriceSource;
pub use traits::PriceSource;
