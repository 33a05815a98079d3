use crate::model::{AlignedRow, ChangeRecord, Commodity};
use std::collections::HashMap;

/// Detail lines kept per section before collapsing into "...and N more".
const MAX_EXAMPLES: usize = 3;

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn describe_row(row: &AlignedRow) -> String {
    let values: Vec<String> = Commodity::ALL
        .iter()
        .map(|c| format!("{}={}", c.label(), fmt_value(row.get(*c))))
        .collect();
    format!("{}: {}", row.date, values.join(", "))
}

fn describe_update(prev: &AlignedRow, next: &AlignedRow) -> String {
    let changes: Vec<String> = Commodity::ALL
        .iter()
        .filter(|c| prev.get(**c) != next.get(**c))
        .map(|c| {
            format!(
                "{} {} -> {}",
                c.label(),
                fmt_value(prev.get(*c)),
                fmt_value(next.get(*c))
            )
        })
        .collect();
    format!("{}: {}", next.date, changes.join(", "))
}

fn differs(prev: &AlignedRow, next: &AlignedRow) -> bool {
    Commodity::ALL.iter().any(|c| prev.get(*c) != next.get(*c))
}

/// Diffs a freshly merged table against the previous one.
///
/// Rows whose date is new count as additions (examples in table order).
/// Rows present in both with any differing commodity field count as updates;
/// those are scanned newest first and the first few described. An empty
/// `details` list means nothing changed.
pub fn detect(previous: &[AlignedRow], next: &[AlignedRow]) -> ChangeRecord {
    let prev_by_date: HashMap<&str, &AlignedRow> =
        previous.iter().map(|row| (row.date.as_str(), row)).collect();

    let additions: Vec<&AlignedRow> = next
        .iter()
        .filter(|row| !prev_by_date.contains_key(row.date.as_str()))
        .collect();

    let mut updated = 0usize;
    let mut update_lines = Vec::new();
    for row in next.iter().rev() {
        let Some(prev) = prev_by_date.get(row.date.as_str()) else {
            continue;
        };
        if differs(prev, row) {
            updated += 1;
            if update_lines.len() < MAX_EXAMPLES {
                update_lines.push(describe_update(prev, row));
            }
        }
    }

    let added = additions.len();
    if added == 0 && updated == 0 {
        return ChangeRecord {
            summary: "No changes".to_string(),
            details: Vec::new(),
            added: 0,
            updated: 0,
        };
    }

    let mut details = Vec::new();
    if added > 0 {
        details.push(format!("New data points: {}", added));
        details.extend(additions.iter().take(MAX_EXAMPLES).map(|row| describe_row(row)));
        if added > MAX_EXAMPLES {
            details.push(format!("...and {} more", added - MAX_EXAMPLES));
        }
    }
    if updated > 0 {
        details.push(format!("Updated data points: {}", updated));
        details.extend(update_lines);
        if updated > MAX_EXAMPLES {
            details.push(format!("...and {} more", updated - MAX_EXAMPLES));
        }
    }

    ChangeRecord {
        summary: format!("Added {} new, {} updated", added, updated),
        details,
        added,
        updated,
    }
}
