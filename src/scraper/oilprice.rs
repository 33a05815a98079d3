use crate::config::OilSourceConfig;
use crate::model::{Commodity, FetchResult, ScraperError};
use crate::parser::{OilPriceParser, Parser};
use crate::scraper::fetcher::read_body;
use crate::scraper::traits::PriceSource;
use reqwest::Client;
use tracing::info;

/// WTI quotes from the oilprice.com widget endpoint.
pub struct OilPriceSource {
    client: Client,
    api_url: String,
    blend_id: u32,
    period: u32,
    parser: OilPriceParser,
}

impl OilPriceSource {
    pub fn new(client: Client, cfg: &OilSourceConfig) -> Self {
        Self {
            client,
            api_url: cfg.api_url.clone(),
            blend_id: cfg.blend_id,
            period: cfg.period,
            parser: OilPriceParser::new(),
        }
    }
}

#[async_trait::async_trait]
impl PriceSource for OilPriceSource {
    fn commodity(&self) -> Commodity {
        Commodity::Oil
    }

    async fn fetch(&self) -> Result<FetchResult, ScraperError> {
        info!("Fetching oil prices (blend {})...", self.blend_id);

        let params = [
            ("blend_id", self.blend_id.to_string()),
            ("period", self.period.to_string()),
            ("futures", "1".to_string()),
        ];
        let response = self
            .client
            .post(&self.api_url)
            .header("accept", "application/json, text/javascript, */*; q=0.01")
            .header("x-requested-with", "XMLHttpRequest")
            .form(&params)
            .send()
            .await?;

        let body = read_body(response).await?;
        let result = self.parser.parse(&body)?;
        info!("Oil: received {} points", result.data.len());
        Ok(result)
    }
}
