// Analyzer module: derived views over the aligned table and diffing between merges.

pub mod change_detector;
pub mod correlation;
pub mod index_transform;
pub mod range_filter;

pub use change_detector::detect;
pub use correlation::{correlate, correlate_all};
pub use index_transform::{transform, DisplayMode};
pub use range_filter::{filter, RangePreset, RangeSelector};

use crate::model::{AlignedRow, Commodity, CorrelationResult, DisplayRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn all_series() -> Vec<Commodity> {
    Commodity::ALL.to_vec()
}

/// How the chart should be drawn. `visible` only affects presentation; the
/// computed rows always carry every commodity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
    #[serde(default)]
    pub range: RangeSelector,
    #[serde(default = "all_series")]
    pub visible: Vec<Commodity>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::default(),
            range: RangeSelector::default(),
            visible: all_series(),
        }
    }
}

/// Everything the chart client needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub rows: Vec<DisplayRow>,
    pub correlations: CorrelationResult,
    pub visible: Vec<Commodity>,
}

/// Range-filters the table once, then derives display rows and correlations
/// from the same window.
pub fn build_view(table: &[AlignedRow], config: &DisplayConfig, today: NaiveDate) -> ChartView {
    let window = filter(table, &config.range, today);
    ChartView {
        rows: transform(&window, config.mode),
        correlations: correlate_all(&window),
        visible: config.visible.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_date;

    #[test]
    fn view_rebases_on_window_start() {
        let table: Vec<AlignedRow> = (1..=8)
            .map(|d| {
                AlignedRow::new(format!("2026-10-{:02}", d + 10))
                    .with(Commodity::Copper, 100.0 + d as f64)
                    .with(Commodity::Oil, 50.0 + d as f64 * 2.0)
            })
            .collect();
        let config = DisplayConfig {
            mode: DisplayMode::Indexed,
            range: RangeSelector::Custom {
                from: "2026-10-13".into(),
                to: None,
            },
            visible: vec![Commodity::Copper],
        };

        let view = build_view(&table, &config, parse_date("2026-10-19").unwrap());
        assert_eq!(view.rows.len(), 6);
        assert_eq!(view.rows[0].date, "2026-10-13");
        assert_eq!(view.rows[0].copper, Some(100.0));
        assert_eq!(view.rows[0].raw_copper, Some(103.0));
        assert!((view.correlations.copper_oil - 1.0).abs() < 1e-9);
        assert_eq!(view.visible, vec![Commodity::Copper]);
        // Hidden series are still computed.
        assert!(view.rows[0].oil.is_some());
    }

    #[test]
    fn default_config_shows_everything() {
        let config: DisplayConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DisplayConfig::default());
        assert_eq!(config.visible.len(), 3);
    }
}
