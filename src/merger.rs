use crate::model::{AlignedRow, AlignedTable, Commodity, RawPoint, SERIES_START};
use crate::normalizer::validate_point;
use std::collections::BTreeMap;
use tracing::debug;

/// Joins the three per-commodity feeds into one table keyed by canonical date.
///
/// A date seen in only one feed produces a row with only that field set; the
/// other fields stay absent. Rows before [`SERIES_START`] are discarded and the
/// result is ascending by date with no duplicates.
pub fn merge(copper: &[RawPoint], zinc: &[RawPoint], oil: &[RawPoint]) -> AlignedTable {
    let mut rows: BTreeMap<String, AlignedRow> = BTreeMap::new();

    for (commodity, points) in [
        (Commodity::Copper, copper),
        (Commodity::Zinc, zinc),
        (Commodity::Oil, oil),
    ] {
        let mut dropped = 0usize;
        for point in points {
            let Some(valid) = validate_point(point) else {
                dropped += 1;
                continue;
            };
            rows.entry(valid.date.clone())
                .or_insert_with(|| AlignedRow::new(valid.date))
                .set(commodity, valid.value);
        }
        if dropped > 0 {
            debug!("{}: dropped {} malformed points", commodity, dropped);
        }
    }

    // BTreeMap iteration is already ascending by key.
    rows.into_values()
        .filter(|row| row.date.as_str() >= SERIES_START)
        .collect()
}
