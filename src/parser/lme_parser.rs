// LME chart-data parsing
use crate::model::{FetchResult, ParserError, RawPoint, RawValue};
use crate::parser::{raw_value, Parser};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(rename = "Labels")]
    labels: Option<Vec<String>>,
    #[serde(rename = "Datasets", default)]
    datasets: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(rename = "RowTitle", default)]
    row_title: String,
    #[serde(rename = "Label", default)]
    label: String,
    #[serde(rename = "Data", default)]
    data: Vec<Value>,
}

impl Dataset {
    fn key(&self) -> String {
        format!("{}_{}", self.row_title, self.label)
            .to_lowercase()
            .replace(' ', "_")
    }
}

/// Parses the LME `Labels`/`Datasets` payload. Each label is one trading day
/// (`DD/MM/YYYY`); the price is the cash bid, or the 3-month bid when no cash
/// bid was published.
pub struct LmeParser;

impl LmeParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LmeParser {
    fn default() -> Self {
        Self::new()
    }
}

fn series<'a>(map: &'a HashMap<String, &'a [Value]>, primary: &str, fallback: &str) -> &'a [Value] {
    map.get(primary)
        .or_else(|| map.get(fallback))
        .copied()
        .unwrap_or(&[])
}

impl Parser for LmeParser {
    fn parse(&self, body: &str) -> Result<FetchResult, ParserError> {
        let chart: ChartData = serde_json::from_str(body)?;
        let labels = chart
            .labels
            .ok_or_else(|| ParserError::MissingField("Labels".into()))?;

        let by_key: HashMap<String, &[Value]> = chart
            .datasets
            .iter()
            .map(|ds| (ds.key(), ds.data.as_slice()))
            .collect();

        let cash_bid = series(&by_key, "cash_bid", "official_price_bid");
        let three_month_bid = series(&by_key, "3-months_bid", "3_months_bid");

        let at = |data: &[Value], i: usize| -> Option<RawValue> { data.get(i).and_then(raw_value) };

        let data = labels
            .into_iter()
            .enumerate()
            .map(|(i, date)| RawPoint {
                value: at(cash_bid, i).or_else(|| at(three_month_bid, i)),
                date: Some(date),
            })
            .collect();

        Ok(FetchResult { data })
    }
}
