use crate::config::AppConfig;
use crate::model::ScraperError;
use reqwest::{Client, Response};
use std::time::Duration;

/// Shared HTTP client for every source. The timeout bounds each upstream
/// request; retries are left to the next scheduled cycle.
pub fn build_client(config: &AppConfig) -> Result<Client, ScraperError> {
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()?;
    Ok(client)
}

/// Reads the body of a successful response; non-2xx statuses are errors.
pub async fn read_body(response: Response) -> Result<String, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::InvalidResponse(status.as_u16()));
    }
    Ok(response.text().await?)
}
