// Core structs: RawPoint, AlignedRow, DisplayRow, ChangeRecord and the error types
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// First date of the tracked series. Nothing earlier is kept or displayed.
pub const SERIES_START: &str = "2023-01-01";

/// `YYYY-MM-DD` join key shared by all series. Kept as a string: malformed
/// source dates pass through the normalizer unchanged.
pub type CanonicalDate = String;

/// Ordered, date-unique rows. Always replaced wholesale, never patched.
pub type AlignedTable = Vec<AlignedRow>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commodity {
    Copper,
    Zinc,
    Oil,
}

impl Commodity {
    pub const ALL: [Commodity; 3] = [Commodity::Copper, Commodity::Zinc, Commodity::Oil];

    /// Persistence key.
    pub fn code(self) -> &'static str {
        match self {
            Commodity::Copper => "COPPER",
            Commodity::Zinc => "ZINC",
            Commodity::Oil => "OIL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Commodity::Copper => "Copper",
            Commodity::Zinc => "Zinc",
            Commodity::Oil => "Oil",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Source values arrive either as JSON numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

/// One observation as delivered by a fetch collaborator, before validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: Option<RawValue>,
}

impl RawPoint {
    pub fn new(date: &str, value: RawValue) -> Self {
        Self {
            date: Some(date.to_string()),
            value: Some(value),
        }
    }
}

/// Per-commodity fetch result: `{ "data": [ { "date": ..., "value": ... } ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchResult {
    pub data: Vec<RawPoint>,
}

/// A validated observation: canonical date and a finite value.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: CanonicalDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date: CanonicalDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zinc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil: Option<f64>,
}

impl AlignedRow {
    pub fn new(date: impl Into<CanonicalDate>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    pub fn with(mut self, commodity: Commodity, value: f64) -> Self {
        self.set(commodity, value);
        self
    }

    pub fn get(&self, commodity: Commodity) -> Option<f64> {
        match commodity {
            Commodity::Copper => self.copper,
            Commodity::Zinc => self.zinc,
            Commodity::Oil => self.oil,
        }
    }

    pub fn set(&mut self, commodity: Commodity, value: f64) {
        let slot = match commodity {
            Commodity::Copper => &mut self.copper,
            Commodity::Zinc => &mut self.zinc,
            Commodity::Oil => &mut self.oil,
        };
        *slot = Some(value);
    }
}

/// Aligned row prepared for charting. `copper`/`zinc`/`oil` hold either the
/// raw value or the base-100 index depending on the display mode; the raw
/// value and the percent change are always carried alongside.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub date: CanonicalDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zinc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oil: Option<f64>,
    pub raw_copper: Option<f64>,
    pub raw_zinc: Option<f64>,
    pub raw_oil: Option<f64>,
    pub pct_copper: f64,
    pub pct_zinc: f64,
    pub pct_oil: f64,
}

impl DisplayRow {
    pub fn value(&self, commodity: Commodity) -> Option<f64> {
        match commodity {
            Commodity::Copper => self.copper,
            Commodity::Zinc => self.zinc,
            Commodity::Oil => self.oil,
        }
    }

    pub fn raw(&self, commodity: Commodity) -> Option<f64> {
        match commodity {
            Commodity::Copper => self.raw_copper,
            Commodity::Zinc => self.raw_zinc,
            Commodity::Oil => self.raw_oil,
        }
    }

    pub fn pct(&self, commodity: Commodity) -> f64 {
        match commodity {
            Commodity::Copper => self.pct_copper,
            Commodity::Zinc => self.pct_zinc,
            Commodity::Oil => self.pct_oil,
        }
    }
}

/// Audit entry for one fetch-and-merge cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub summary: String,
    pub details: Vec<String>,
    #[serde(default)]
    pub added: usize,
    #[serde(default)]
    pub updated: usize,
}

impl ChangeRecord {
    /// True when the diff found nothing; such records are not persisted.
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CorrelationResult {
    pub copper_oil: f64,
    pub zinc_oil: f64,
    pub copper_zinc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestPrice {
    pub commodity: Commodity,
    pub date: CanonicalDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub commodity: Commodity,
    pub count: usize,
    pub earliest: CanonicalDate,
    pub latest: CanonicalDate,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned status {0}")]
    InvalidResponse(u16),
    #[error(transparent)]
    Parse(#[from] ParserError),
}

impl From<reqwest::Error> for ScraperError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScraperError::Timeout
        } else {
            ScraperError::Http(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("corrupt stored value: {0}")]
    Corrupt(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a fetch cycle is already running")]
    CycleInProgress,
    #[error("failed to fetch {commodity}: {source}")]
    Fetch {
        commodity: Commodity,
        #[source]
        source: ScraperError,
    },
    #[error("failed to persist merged table: {0}")]
    Storage(#[from] StorageError),
}
