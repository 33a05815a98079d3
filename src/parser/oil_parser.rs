// oilprice.com widget parsing
use crate::model::{FetchResult, ParserError, RawPoint};
use crate::parser::{raw_value, Parser};
use crate::utils::date_from_unix;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct OilPrices {
    prices: Option<Vec<OilQuote>>,
}

#[derive(Debug, Deserialize)]
struct OilQuote {
    #[serde(default)]
    time: Value,
    #[serde(default)]
    price: Value,
}

impl OilQuote {
    /// `time` is unix seconds, sent either as a number or a string.
    fn date(&self) -> Option<String> {
        let seconds = match &self.time {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        date_from_unix(seconds)
    }
}

/// Parses the `prices` array of the oil widget. Several quotes can fall on the
/// same UTC day; the last one wins.
pub struct OilPriceParser;

impl OilPriceParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OilPriceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for OilPriceParser {
    fn parse(&self, body: &str) -> Result<FetchResult, ParserError> {
        let payload: OilPrices = serde_json::from_str(body)?;
        let quotes = payload
            .prices
            .ok_or_else(|| ParserError::MissingField("prices".into()))?;

        let mut data: Vec<RawPoint> = Vec::with_capacity(quotes.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        for quote in &quotes {
            let point = RawPoint {
                date: quote.date(),
                value: raw_value(&quote.price),
            };
            let existing = point.date.as_ref().and_then(|d| seen.get(d).copied());
            match existing {
                Some(idx) => data[idx] = point,
                None => {
                    if let Some(date) = &point.date {
                        seen.insert(date.clone(), data.len());
                    }
                    data.push(point);
                }
            }
        }

        Ok(FetchResult { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawValue;

    #[test]
    fn converts_timestamps_and_dedups_by_day() {
        let body = r#"{"prices": [
            {"time": 1769904000, "price": 72.1},
            {"time": "1769947200", "price": "72.4"},
            {"time": 1769990400, "price": 73}
        ]}"#;
        let result = OilPriceParser::new().parse(body).unwrap();
        assert_eq!(
            result.data,
            vec![
                RawPoint::new("2026-02-01", RawValue::Text("72.4".into())),
                RawPoint::new("2026-02-02", RawValue::Number(73.0)),
            ]
        );
    }

    #[test]
    fn bad_timestamps_leave_date_empty() {
        let body = r#"{"prices": [{"time": "soon", "price": 70.0}, {"price": 71.0}]}"#;
        let result = OilPriceParser::new().parse(body).unwrap();
        assert_eq!(result.data.len(), 2);
        assert!(result.data.iter().all(|p| p.date.is_none()));
    }

    #[test]
    fn missing_prices_is_an_error() {
        assert!(matches!(
            OilPriceParser::new().parse("{}"),
            Err(ParserError::MissingField(_))
        ));
    }
}
