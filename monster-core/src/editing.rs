//! Record editing helpers: add, update, delete, lookup and display.

use crate::error::{MonsterError, Result};
use crate::models::{Field, Row, FIELD_COUNT, ZERO_VALUE};
use crate::parsers::{decode_line, encode_row};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Append a new monster with the next free Index and return a copy of it.
///
/// The Index is one past the highest numeric Index. If any Index is not a
/// number, or the highest Index cannot be incremented, the row count is used
/// instead; an empty list starts at 0.
pub fn add_row(rows: &mut Vec<Row>) -> Row {
    let next_index = if rows.is_empty() {
        0
    } else {
        rows.iter()
            .map(|row| row.index().parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .ok()
            .and_then(|indices| indices.into_iter().max())
            .and_then(|max| max.checked_add(1))
            .unwrap_or(rows.len() as u64)
    };

    let mut row = Row::zeroed();
    row.set(Field::Index, next_index.to_string());
    row.set(Field::Rate, "1");
    row.set(Field::Name, format!("New Monster {}", next_index));

    info!("Added monster [{}] at position {}", next_index, rows.len());
    rows.push(row.clone());
    row
}

/// Clean up user-entered values: trim, strip quotes from Name, blank → `"0"`.
fn sanitize_values<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .map(|(position, value)| {
            let mut value = value.as_ref().trim();
            if position == Field::Name.position() {
                value = value.trim_matches('"').trim();
            }
            if value.is_empty() {
                ZERO_VALUE.to_string()
            } else {
                value.to_string()
            }
        })
        .collect()
}

/// Replace the row at `position` with `new_values` (one per schema field).
///
/// The replacement must survive a save/load cycle unchanged, otherwise it is
/// rejected and nothing is modified.
pub fn update_row<S: AsRef<str>>(rows: &mut [Row], position: usize, new_values: &[S]) -> Result<()> {
    if position >= rows.len() {
        return Err(MonsterError::NotFound(format!(
            "Row {} (only {} rows loaded)",
            position,
            rows.len()
        )));
    }
    if new_values.len() != FIELD_COUNT {
        return Err(MonsterError::Validation(format!(
            "Expected {} values, got {}",
            FIELD_COUNT,
            new_values.len()
        )));
    }

    let row = Row::from_values(sanitize_values(new_values))?;
    if decode_line(&encode_row(&row)).as_ref() != Some(&row) {
        return Err(MonsterError::Validation(format!(
            "Monster [{}] {:?} cannot be written as a record: Index and Rate must be digits, \
             Name must not contain quotes and values must not contain spaces",
            row.index(),
            row.name()
        )));
    }

    info!("Updated monster [{}] {} at position {}", row.index(), row.name(), position);
    rows[position] = row;
    Ok(())
}

/// Remove and return the row at `position`. Other rows keep their Index.
pub fn delete_row(rows: &mut Vec<Row>, position: usize) -> Result<Row> {
    if position >= rows.len() {
        return Err(MonsterError::NotFound(format!(
            "Row {} (only {} rows loaded)",
            position,
            rows.len()
        )));
    }
    let removed = rows.remove(position);
    info!("Deleted monster [{}] {}", removed.index(), removed.name());
    Ok(removed)
}

/// Position of the first row whose Index equals `index`.
pub fn find_by_index(rows: &[Row], index: &str) -> Option<usize> {
    let index = index.trim();
    rows.iter().position(|row| row.index() == index)
}

/// List label: `[<Index>] <Name> (Lv <Level>)`.
pub fn display_label(row: &Row) -> String {
    format!("[{}] {} (Lv {})", row.index(), row.name(), row.get(Field::Level))
}

/// Positions of rows whose label contains `query`, ignoring case.
pub fn search_rows(rows: &[Row], query: &str) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| query.is_empty() || display_label(row).to_lowercase().contains(&query))
        .map(|(position, _)| position)
        .collect()
}

/// One `Field: value` line per schema field.
pub fn format_preview(row: &Row) -> String {
    row.iter()
        .map(|(field, value)| format!("{}: {}", field, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The row as a pretty-printed JSON object keyed by field name.
pub fn preview_json(row: &Row) -> Result<String> {
    let map: serde_json::Map<String, serde_json::Value> = row
        .iter()
        .map(|(field, value)| (field.name().to_string(), value.into()))
        .collect();
    Ok(serde_json::to_string_pretty(&map)?)
}

/// Index values carried by more than one row, with their positions.
pub fn duplicate_indices(rows: &[Row]) -> BTreeMap<String, Vec<usize>> {
    let mut seen: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (position, row) in rows.iter().enumerate() {
        seen.entry(row.index().to_string()).or_default().push(position);
    }
    seen.retain(|_, positions| positions.len() > 1);

    for (index, positions) in &seen {
        warn!("Index {} is shared by rows {:?}", index, positions);
    }
    seen
}
