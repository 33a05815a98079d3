use crate::model::{AlignedRow, Commodity, DisplayRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Absolute,
    Indexed,
}

/// Baseline for one commodity: its value on the first row of the window, or
/// `1` when the first row lacks it.
fn baseline(rows: &[AlignedRow], commodity: Commodity) -> f64 {
    rows.first().and_then(|row| row.get(commodity)).unwrap_or(1.0)
}

/// Percent change against `base`. A zero baseline has no scale and yields 0.
fn pct_change(value: Option<f64>, base: f64) -> f64 {
    match value {
        Some(v) if base != 0.0 => (v - base) / base * 100.0,
        _ => 0.0,
    }
}

/// Rescales a window into display rows.
///
/// Percent change is computed against the window's first row for every
/// commodity independently. In [`DisplayMode::Indexed`] the commodity fields
/// become `100 + pct`; the raw value stays available either way.
pub fn transform(rows: &[AlignedRow], mode: DisplayMode) -> Vec<DisplayRow> {
    let [base_copper, base_zinc, base_oil] = Commodity::ALL.map(|c| baseline(rows, c));

    rows.iter()
        .map(|row| {
            let pct_copper = pct_change(row.copper, base_copper);
            let pct_zinc = pct_change(row.zinc, base_zinc);
            let pct_oil = pct_change(row.oil, base_oil);

            let shown = |raw: Option<f64>, pct: f64| match mode {
                DisplayMode::Absolute => raw,
                DisplayMode::Indexed => raw.map(|_| 100.0 + pct),
            };

            DisplayRow {
                date: row.date.clone(),
                copper: shown(row.copper, pct_copper),
                zinc: shown(row.zinc, pct_zinc),
                oil: shown(row.oil, pct_oil),
                raw_copper: row.copper,
                raw_zinc: row.zinc,
                raw_oil: row.oil,
                pct_copper,
                pct_zinc,
                pct_oil,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Vec<AlignedRow> {
        vec![
            AlignedRow::new("2026-02-01")
                .with(Commodity::Copper, 100.0)
                .with(Commodity::Zinc, 50.0),
            AlignedRow::new("2026-02-02")
                .with(Commodity::Copper, 110.0)
                .with(Commodity::Oil, 70.0),
            AlignedRow::new("2026-02-03")
                .with(Commodity::Copper, 90.0)
                .with(Commodity::Zinc, 60.0),
        ]
    }

    #[test]
    fn indexed_first_row_is_one_hundred() {
        let out = transform(&window(), DisplayMode::Indexed);
        assert_eq!(out[0].copper, Some(100.0));
        assert_eq!(out[0].pct_copper, 0.0);
        assert_eq!(out[0].raw_copper, Some(100.0));
        assert!((out[1].copper.unwrap() - 110.0).abs() < 1e-9);
        assert!((out[2].pct_copper + 10.0).abs() < 1e-9);
        assert!((out[2].zinc.unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn absolute_mode_keeps_raw_values() {
        let out = transform(&window(), DisplayMode::Absolute);
        assert_eq!(out[1].copper, Some(110.0));
        assert!((out[1].pct_copper - 10.0).abs() < 1e-9);
        assert_eq!(out[2].zinc, Some(60.0));
        assert!((out[2].pct_zinc - 20.0).abs() < 1e-9);
    }

    #[test]
    fn missing_first_value_falls_back_to_unit_baseline() {
        // Oil is absent on the first row, so its baseline is 1.
        let out = transform(&window(), DisplayMode::Indexed);
        assert!((out[1].pct_oil - 6900.0).abs() < 1e-9);
        assert!((out[1].oil.unwrap() - 7000.0).abs() < 1e-9);
        assert_eq!(out[1].raw_oil, Some(70.0));
    }

    #[test]
    fn absent_values_have_zero_pct_and_no_field() {
        let out = transform(&window(), DisplayMode::Indexed);
        assert_eq!(out[1].zinc, None);
        assert_eq!(out[1].raw_zinc, None);
        assert_eq!(out[1].pct_zinc, 0.0);
    }

    #[test]
    fn empty_and_single_row_windows() {
        assert!(transform(&[], DisplayMode::Indexed).is_empty());

        let single = vec![AlignedRow::new("2026-02-01")
            .with(Commodity::Copper, 8800.0)
            .with(Commodity::Oil, 0.0)];
        let out = transform(&single, DisplayMode::Indexed);
        assert_eq!(out.len(), 1);
        for commodity in [Commodity::Copper, Commodity::Oil] {
            assert_eq!(out[0].pct(commodity), 0.0, "{commodity}");
            assert_eq!(out[0].value(commodity), Some(100.0), "{commodity}");
        }
        assert_eq!(out[0].raw(Commodity::Oil), Some(0.0));
        assert_eq!(out[0].value(Commodity::Zinc), None);
    }

    #[test]
    fn zero_baseline_resolves_to_zero_pct() {
        let rows = vec![
            AlignedRow::new("2026-02-01").with(Commodity::Copper, 0.0),
            AlignedRow::new("2026-02-02").with(Commodity::Copper, 120.0),
        ];
        let out = transform(&rows, DisplayMode::Indexed);
        for row in &out {
            assert_eq!(row.pct(Commodity::Copper), 0.0);
            assert_eq!(row.value(Commodity::Copper), Some(100.0));
        }
        assert_eq!(out[1].raw(Commodity::Copper), Some(120.0));

        let absolute = transform(&rows, DisplayMode::Absolute);
        assert_eq!(absolute[1].value(Commodity::Copper), Some(120.0));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let out = transform(&window()[..1], DisplayMode::Absolute);
        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json["rawCopper"], 100.0);
        assert_eq!(json["pctZinc"], 0.0);
        assert!(json.get("oil").is_none());
    }
}
