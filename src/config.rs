use crate::analyzer::DisplayConfig;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LmeSourceConfig {
    pub datasource_id: String,
    #[serde(default = "default_lme_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OilSourceConfig {
    #[serde(default = "default_oil_api_url")]
    pub api_url: String,
    #[serde(default = "default_blend_id")]
    pub blend_id: u32,
    #[serde(default = "default_period")]
    pub period: u32,
}

impl Default for OilSourceConfig {
    fn default() -> Self {
        Self {
            api_url: default_oil_api_url(),
            blend_id: default_blend_id(),
            period: default_period(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub copper: LmeSourceConfig,
    pub zinc: LmeSourceConfig,
    #[serde(default)]
    pub oil: OilSourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_lme_api_url() -> String {
    "https://www.lme.com/api/trading-data/chart-data".to_string()
}

fn default_oil_api_url() -> String {
    "https://oilprice.com/freewidgets/json_get_oilprices".to_string()
}

fn default_blend_id() -> u32 {
    39
}

fn default_period() -> u32 {
    7
}

fn default_check_interval() -> u64 {
    3600
}

fn default_database_path() -> String {
    "data.db".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) CommodityTracker/0.1".to_string()
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
