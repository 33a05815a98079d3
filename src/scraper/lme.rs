use crate::config::LmeSourceConfig;
use crate::model::{Commodity, FetchResult, ScraperError, SERIES_START};
use crate::parser::{LmeParser, Parser};
use crate::scraper::fetcher::read_body;
use crate::scraper::traits::PriceSource;
use crate::utils::{format_date, today};
use reqwest::Client;
use tracing::info;

/// LME chart-data feed for one metal (copper or zinc).
pub struct LmeSource {
    client: Client,
    commodity: Commodity,
    datasource_id: String,
    api_url: String,
    parser: LmeParser,
}

impl LmeSource {
    pub fn new(client: Client, commodity: Commodity, cfg: &LmeSourceConfig) -> Self {
        Self {
            client,
            commodity,
            datasource_id: cfg.datasource_id.clone(),
            api_url: cfg.api_url.clone(),
            parser: LmeParser::new(),
        }
    }
}

#[async_trait::async_trait]
impl PriceSource for LmeSource {
    fn commodity(&self) -> Commodity {
        self.commodity
    }

    async fn fetch(&self) -> Result<FetchResult, ScraperError> {
        let end_date = format_date(today());
        info!(
            "Fetching {} from LME ({} to {})...",
            self.commodity, SERIES_START, end_date
        );

        let response = self
            .client
            .get(&self.api_url)
            .header("accept", "*/*")
            .header("cache-control", "no-cache")
            .query(&[
                ("datasourceId", self.datasource_id.as_str()),
                ("startDate", SERIES_START),
                ("endDate", end_date.as_str()),
            ])
            .send()
            .await?;

        let body = read_body(response).await?;
        let result = self.parser.parse(&body)?;
        info!("{}: received {} points", self.commodity, result.data.len());
        Ok(result)
    }
}
