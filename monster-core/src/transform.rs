//! Bulk percentage adjustment of numeric monster fields.

use crate::error::{MonsterError, Result};
use crate::models::{Field, Row};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Outcome of one `apply_percentage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformSummary {
    /// Rows with at least one transformed field.
    pub affected_rows: usize,
    /// Individual (row, field) values rewritten.
    pub changed_cells: usize,
    pub percent: f64,
    pub fields: Vec<Field>,
}

/// Parse a user-supplied percentage such as `"20"` or `"-15.5"`.
pub fn parse_percent(text: &str) -> Result<f64> {
    let percent: f64 = text.trim().parse().map_err(|_| {
        MonsterError::Validation(format!("Invalid percentage: {:?}", text))
    })?;
    if !percent.is_finite() {
        return Err(MonsterError::Validation(format!(
            "Invalid percentage: {:?}",
            text
        )));
    }
    Ok(percent)
}

/// Resolve field names to targetable schema fields, dropping duplicates.
pub fn resolve_fields<S: AsRef<str>>(names: &[S]) -> Result<Vec<Field>> {
    let mut fields: Vec<Field> = Vec::with_capacity(names.len());
    for name in names {
        let field: Field = name.as_ref().parse()?;
        if !field.is_targetable() {
            return Err(MonsterError::Validation(format!(
                "Field {} cannot be adjusted by percentage",
                field
            )));
        }
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    Ok(fields)
}

/// Parse a stored value as a finite real number.
fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Scale one stored value by `factor`.
///
/// Integral values stay integral, rounded half away from zero (so 2.5 becomes
/// 3, where a half-to-even rule would give 2); fractional values are written
/// with two decimals. Non-numeric values, and results that overflow to
/// infinity, yield `None`.
pub fn scale_value(value: &str, factor: f64) -> Option<String> {
    let original = parse_number(value)?;
    let scaled = original * factor;
    if !scaled.is_finite() {
        return None;
    }

    if original.fract() == 0.0 {
        let rounded = scaled.round();
        if rounded == 0.0 {
            Some("0".to_string())
        } else {
            Some(format!("{:.0}", rounded))
        }
    } else {
        Some(format!("{:.2}", scaled))
    }
}

/// Multiply the chosen fields of the chosen rows by `1 + percent / 100`.
///
/// Every input is validated before any row is touched: empty selections,
/// a non-finite percentage or a non-targetable field are `Validation` errors
/// and an out-of-range position is `NotFound`. Fields whose value is not a
/// number are skipped silently.
pub fn apply_percentage<S: AsRef<str>>(
    rows: &mut [Row],
    row_indices: &[usize],
    field_names: &[S],
    percent: f64,
) -> Result<TransformSummary> {
    if row_indices.is_empty() {
        return Err(MonsterError::Validation(
            "Select at least one monster".to_string(),
        ));
    }
    if field_names.is_empty() {
        return Err(MonsterError::Validation(
            "Select at least one field".to_string(),
        ));
    }
    if !percent.is_finite() {
        return Err(MonsterError::Validation(format!(
            "Invalid percentage: {}",
            percent
        )));
    }

    let fields = resolve_fields(field_names)?;
    let positions: BTreeSet<usize> = row_indices.iter().copied().collect();
    if let Some(&out_of_range) = positions.iter().find(|&&p| p >= rows.len()) {
        return Err(MonsterError::NotFound(format!(
            "Row {} (only {} rows loaded)",
            out_of_range,
            rows.len()
        )));
    }

    let factor = 1.0 + percent / 100.0;
    let mut affected_rows = 0;
    let mut changed_cells = 0;

    for &position in &positions {
        let row = &mut rows[position];
        let mut changed = false;

        for &field in &fields {
            match scale_value(row.get(field), factor) {
                Some(new_value) => {
                    row.set(field, new_value);
                    changed_cells += 1;
                    changed = true;
                }
                None => debug!(
                    "Skipping non-numeric {} = {:?} for monster [{}]",
                    field,
                    row.get(field),
                    row.index()
                ),
            }
        }

        if changed {
            affected_rows += 1;
        }
    }

    info!(
        "Applied {}% to {} monsters ({} values) in {}",
        percent,
        affected_rows,
        changed_cells,
        fields
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(TransformSummary {
        affected_rows,
        changed_cells,
        percent,
        fields,
    })
}

/// `apply_percentage` over every row.
pub fn apply_percentage_to_all<S: AsRef<str>>(
    rows: &mut [Row],
    field_names: &[S],
    percent: f64,
) -> Result<TransformSummary> {
    let all: Vec<usize> = (0..rows.len()).collect();
    apply_percentage(rows, &all, field_names, percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::decode_line;

    fn sample_rows() -> Vec<Row> {
        [
            r#"0 1 "Bull Fighter" 6 100 0 16 20 6 0 28 6 3 0 1 5 400 1600 10 2 0 0 0 0 0 0 0 0"#,
            r#"1 1 "Hound" 9 140 0 22 27 9 0 39 9 3 0 1 5 400 1600 10 2 0 0 0 0 0 0 0 0"#,
            r#"2 1 "Budge Dragon" 4 100.5 0 12 15 4 0 20 4 3 0 1 5 400 1600 10 2 0 0 0 0 0 0 0 0"#,
            r#"3 1 "Spider" 2 x 0 6 8"#,
            r#"4 1 "Elite Bull" 12 abc 0 40 45"#,
        ]
        .iter()
        .map(|line| decode_line(line).unwrap())
        .collect()
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("20").unwrap(), 20.0);
        assert_eq!(parse_percent(" -15.5 ").unwrap(), -15.5);
        assert!(matches!(parse_percent("ten"), Err(MonsterError::Validation(_))));
        assert!(matches!(parse_percent(""), Err(MonsterError::Validation(_))));
        assert!(matches!(parse_percent("NaN"), Err(MonsterError::Validation(_))));
    }

    #[test]
    fn test_scale_value_integer_and_decimal() {
        assert_eq!(scale_value("100", 1.1), Some("110".to_string()));
        assert_eq!(scale_value("100.5", 1.1), Some("110.55".to_string()));
        assert_eq!(scale_value("15", 0.9), Some("14".to_string()));
        assert_eq!(scale_value("3", 0.5), Some("2".to_string()));
        assert_eq!(scale_value("-3", 0.5), Some("-2".to_string()));
        assert_eq!(scale_value("1", 0.2), Some("0".to_string()));
        assert_eq!(scale_value("x", 1.1), None);
        assert_eq!(scale_value("", 1.1), None);
        assert_eq!(scale_value("inf", 1.1), None);
    }

    #[test]
    fn test_scale_value_overflow_left_unchanged() {
        assert_eq!(scale_value("1e308", 2.0), None);
        assert_eq!(scale_value("-1e308", 2.0), None);
        assert_eq!(scale_value("1.5e308", 2.0), None);

        let mut rows = vec![decode_line(r#"0 1 "Big" 1e308 5"#).unwrap()];
        let summary = apply_percentage(&mut rows, &[0], &["Level", "MaxLife"], 100.0).unwrap();

        assert_eq!(summary.affected_rows, 1);
        assert_eq!(summary.changed_cells, 1);
        assert_eq!(rows[0].get(Field::Level), "1e308");
        assert_eq!(rows[0].get(Field::MaxLife), "10");

        let mut rows = vec![decode_line(r#"0 1 "Big" 1e308"#).unwrap()];
        let summary = apply_percentage(&mut rows, &[0], &["Level"], 100.0).unwrap();
        assert_eq!(summary.affected_rows, 0);
        assert_eq!(rows[0].get(Field::Level), "1e308");
    }

    #[test]
    fn test_apply_selected_fields_only() {
        let mut rows = sample_rows();
        let before = rows.clone();

        let summary = apply_percentage(&mut rows, &[0, 1], &["MaxLife"], 10.0).unwrap();

        assert_eq!(summary.affected_rows, 2);
        assert_eq!(summary.changed_cells, 2);
        assert_eq!(rows[0].get(Field::MaxLife), "110");
        assert_eq!(rows[1].get(Field::MaxLife), "154");
        for position in 0..2 {
            for (field, value) in before[position].iter() {
                if field != Field::MaxLife {
                    assert_eq!(rows[position].get(field), value);
                }
            }
        }
        assert_eq!(rows[2..], before[2..]);
    }

    #[test]
    fn test_apply_decimal_field() {
        let mut rows = sample_rows();
        apply_percentage(&mut rows, &[2], &["MaxLife", "DamageMin"], 10.0).unwrap();
        assert_eq!(rows[2].get(Field::MaxLife), "110.55");
        assert_eq!(rows[2].get(Field::DamageMin), "13");
    }

    #[test]
    fn test_affected_count_skips_non_numeric_rows() {
        let mut rows = sample_rows();
        let summary = apply_percentage(&mut rows, &[0, 1, 2, 3, 4], &["MaxLife"], 20.0).unwrap();

        assert_eq!(summary.affected_rows, 3);
        assert_eq!(rows[3].get(Field::MaxLife), "x");
        assert_eq!(rows[4].get(Field::MaxLife), "abc");
    }

    #[test]
    fn test_zero_percent_keeps_integral_values() {
        let mut rows = sample_rows();
        let before = rows.clone();
        let fields: Vec<&str> = Field::targetable().iter().map(|f| f.name()).collect();

        apply_percentage_to_all(&mut rows, &fields[..], 0.0).unwrap();

        for (row, original) in rows.iter().zip(before.iter()) {
            for (field, value) in original.iter() {
                if value != "100.5" {
                    assert_eq!(row.get(field), value);
                }
            }
        }
        assert_eq!(rows[2].get(Field::MaxLife), "100.50");
    }

    #[test]
    fn test_negative_percent() {
        let mut rows = sample_rows();
        apply_percentage(&mut rows, &[0], &["DamageMax"], -15.5).unwrap();
        assert_eq!(rows[0].get(Field::DamageMax), "17");
    }

    #[test]
    fn test_duplicate_positions_apply_once() {
        let mut rows = sample_rows();
        let summary = apply_percentage(&mut rows, &[0, 0, 0], &["MaxLife", "maxlife"], 10.0).unwrap();
        assert_eq!(summary.affected_rows, 1);
        assert_eq!(summary.fields, vec![Field::MaxLife]);
        assert_eq!(rows[0].get(Field::MaxLife), "110");
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut rows = sample_rows();
        let before = rows.clone();

        let no_rows = apply_percentage(&mut rows, &[], &["MaxLife"], 10.0);
        assert!(matches!(no_rows, Err(MonsterError::Validation(_))));

        let no_fields: [&str; 0] = [];
        let result = apply_percentage(&mut rows, &[0], &no_fields, 10.0);
        assert!(matches!(result, Err(MonsterError::Validation(_))));

        assert_eq!(rows, before);
    }

    #[test]
    fn test_invalid_inputs_leave_rows_untouched() {
        let mut rows = sample_rows();
        let before = rows.clone();

        assert!(matches!(
            apply_percentage(&mut rows, &[0], &["Name"], 10.0),
            Err(MonsterError::Validation(_))
        ));
        assert!(matches!(
            apply_percentage(&mut rows, &[0], &["Bogus"], 10.0),
            Err(MonsterError::Validation(_))
        ));
        assert!(matches!(
            apply_percentage(&mut rows, &[0], &["MaxLife"], f64::NAN),
            Err(MonsterError::Validation(_))
        ));
        assert!(matches!(
            apply_percentage(&mut rows, &[0, 99], &["MaxLife"], 10.0),
            Err(MonsterError::NotFound(_))
        ));

        assert_eq!(rows, before);
    }
}
