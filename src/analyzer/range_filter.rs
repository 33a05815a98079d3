use crate::model::{AlignedRow, AlignedTable, SERIES_START};
use crate::utils::{format_date, months_before, start_of_year};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangePreset {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[default]
    Max,
}

impl RangePreset {
    /// Earliest date kept by this preset, never before the series start.
    pub fn cutoff(self, today: NaiveDate) -> String {
        let cutoff = match self {
            RangePreset::OneMonth => format_date(months_before(today, 1)),
            RangePreset::ThreeMonths => format_date(months_before(today, 3)),
            RangePreset::SixMonths => format_date(months_before(today, 6)),
            RangePreset::OneYear => format_date(months_before(today, 12)),
            RangePreset::YearToDate => format_date(start_of_year(today)),
            RangePreset::Max => SERIES_START.to_string(),
        };
        if cutoff.as_str() < SERIES_START {
            SERIES_START.to_string()
        } else {
            cutoff
        }
    }
}

/// Either a named preset (`"1M"`, `"YTD"`, ...) or an explicit date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeSelector {
    Preset(RangePreset),
    Custom {
        from: String,
        #[serde(default)]
        to: Option<String>,
    },
}

impl Default for RangeSelector {
    fn default() -> Self {
        RangeSelector::Preset(RangePreset::Max)
    }
}

/// Narrows the table to the selected window. Values and order are untouched.
pub fn filter(table: &[AlignedRow], selector: &RangeSelector, today: NaiveDate) -> AlignedTable {
    match selector {
        RangeSelector::Preset(preset) => {
            let cutoff = preset.cutoff(today);
            table
                .iter()
                .filter(|row| row.date >= cutoff)
                .cloned()
                .collect()
        }
        RangeSelector::Custom { from, to } => table
            .iter()
            .filter(|row| row.date.as_str() >= from.as_str())
            .filter(|row| to.as_deref().is_none_or(|to| row.date.as_str() <= to))
            .cloned()
            .collect(),
    }
}
