use crate::model::{CanonicalDate, PricePoint, RawPoint, RawValue};

/// Converts a source date into the canonical `YYYY-MM-DD` form.
///
/// Slash-delimited input is read as `DD/MM/YYYY`; anything else is assumed
/// to be canonical already and returned unchanged. Never fails.
pub fn normalize_date(raw: &str) -> CanonicalDate {
    if raw.contains('/') {
        let parts: Vec<&str> = raw.split('/').collect();
        if let [day, month, year] = parts.as_slice() {
            return format!("{}-{}-{}", year, month, day);
        }
    }
    raw.to_string()
}

/// Parses a source value. Unparseable or non-finite values yield `None`.
pub fn parse_value(raw: &RawValue) -> Option<f64> {
    let value = match raw {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Boundary step between untyped source payloads and the merger: points
/// missing a date or a usable value are dropped, never defaulted.
pub fn validate_point(point: &RawPoint) -> Option<PricePoint> {
    let date = point.date.as_deref()?;
    let value = parse_value(point.value.as_ref()?)?;
    Some(PricePoint {
        date: normalize_date(date),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_dates_are_reordered() {
        assert_eq!(normalize_date("04/02/2026"), "2026-02-04");
    }

    #[test]
    fn iso_dates_pass_through() {
        assert_eq!(normalize_date("2026-02-04"), "2026-02-04");
    }

    #[test]
    fn malformed_dates_do_not_panic() {
        assert_eq!(normalize_date("garbage"), "garbage");
        assert_eq!(normalize_date(""), "");
        // Wrong number of components is left alone.
        assert_eq!(normalize_date("02/2026"), "02/2026");
        assert_eq!(normalize_date("1/2/3/4"), "1/2/3/4");
    }

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert_eq!(parse_value(&RawValue::Number(9876.5)), Some(9876.5));
        assert_eq!(parse_value(&RawValue::Text(" 100.25 ".into())), Some(100.25));
        assert_eq!(parse_value(&RawValue::Text("n/a".into())), None);
        assert_eq!(parse_value(&RawValue::Text("".into())), None);
        assert_eq!(parse_value(&RawValue::Text("NaN".into())), None);
        assert_eq!(parse_value(&RawValue::Text("inf".into())), None);
    }

    #[test]
    fn incomplete_points_are_dropped() {
        let no_date = RawPoint {
            date: None,
            value: Some(RawValue::Number(1.0)),
        };
        let no_value = RawPoint {
            date: Some("2026-02-01".into()),
            value: None,
        };
        assert!(validate_point(&no_date).is_none());
        assert!(validate_point(&no_value).is_none());

        let ok = validate_point(&RawPoint::new("01/02/2026", RawValue::Text("100".into())));
        assert_eq!(
            ok,
            Some(PricePoint {
                date: "2026-02-01".into(),
                value: 100.0
            })
        );
    }
}
