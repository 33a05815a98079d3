// Upstream payload decoding: turns source-specific JSON into per-commodity point lists.

pub mod lme_parser;
pub mod oil_parser;

pub use lme_parser::LmeParser;
pub use oil_parser::OilPriceParser;

use crate::model::{FetchResult, ParserError, RawValue};
use serde_json::Value;

pub trait Parser {
    fn parse(&self, body: &str) -> Result<FetchResult, ParserError>;
}

/// Maps a JSON scalar to a raw value. Nulls, blanks and zero count as missing,
/// matching the upstream convention of leaving unpublished prices empty.
pub(crate) fn raw_value(value: &Value) -> Option<RawValue> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| *v != 0.0).map(RawValue::Number),
        Value::String(s) if !s.trim().is_empty() => Some(RawValue::Text(s.clone())),
        _ => None,
    }
}
