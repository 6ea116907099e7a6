//! Line codec for `Monster.txt`.
//!
//! Records look like:
//! ```text
//! //Index   Rate   Name                                 Level ...
//! 0       1       "Bull Fighter"                     6 100 0 16 20 6 0 28 6 3 0 1 5 400 1600 10 2 0 0 0 0 0 0 0 0
//! end
//! ```
//! Any line that does not match the record grammar is kept verbatim.

use crate::models::{Document, FIELD_COUNT, Field, Row, ZERO_VALUE};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

/// Sentinel line closing the record body.
pub const TERMINATOR: &str = "end";

pub const COMMENT_MARKER: &str = "//";

/// Header written when the loaded file had none.
pub const DEFAULT_HEADER: &str = "//Index   Rate   Name                                 Level ...";

const INDEX_WIDTH: usize = 8;
const RATE_WIDTH: usize = 8;
const NAME_WIDTH: usize = 35;

lazy_static! {
    static ref RECORD_RE: Regex = Regex::new(r#"^(\d+)\s+(\d+)\s+"([^"]+)"\s+(.*)$"#).unwrap();
}

/// True when `line` is the body terminator (`end`, any case, surrounding whitespace ignored).
pub fn is_terminator(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(TERMINATOR)
}

/// Decode one line into a row, or `None` when the line is passthrough content.
///
/// Rows shorter than the schema are padded with `"0"`, longer ones truncated.
pub fn decode_line(line: &str) -> Option<Row> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_MARKER) || is_terminator(line) {
        return None;
    }

    let caps = RECORD_RE.captures(line)?;
    let mut values: Vec<String> = Vec::with_capacity(FIELD_COUNT);
    values.push(caps.get(1)?.as_str().to_string());
    values.push(caps.get(2)?.as_str().to_string());
    values.push(caps.get(3)?.as_str().to_string());
    values.extend(
        caps.get(4)?
            .as_str()
            .split_whitespace()
            .map(str::to_string),
    );

    values.resize(FIELD_COUNT, ZERO_VALUE.to_string());
    Row::from_values(values).ok()
}

/// Left-justify `value` to `width`, always leaving at least one trailing space.
fn pad_column(value: &str, width: usize) -> String {
    let fill = width.saturating_sub(value.chars().count()).max(1);
    format!("{}{}", value, " ".repeat(fill))
}

/// Encode a row back into the on-disk record grammar.
pub fn encode_row(row: &Row) -> String {
    let quoted_name = format!("\"{}\"", row.name());
    let rest: Vec<&str> = row
        .iter()
        .filter(|(field, _)| field.position() > Field::Name.position())
        .map(|(_, value)| value)
        .collect();

    format!(
        "{}{}{}{}",
        pad_column(row.index(), INDEX_WIDTH),
        pad_column(row.get(Field::Rate), RATE_WIDTH),
        pad_column(&quoted_name, NAME_WIDTH),
        rest.join(" ")
    )
}

/// Split file content into header, rows and footer.
///
/// Lines before the terminator are rows when they decode and header otherwise.
/// The terminator and every line after it go to the footer unparsed.
pub fn parse_document(text: &str) -> Document {
    let mut document = Document::new();
    let mut in_body = true;

    for line in text.lines() {
        if in_body && is_terminator(line) {
            document.footer.push(line.to_string());
            in_body = false;
            continue;
        }

        if !in_body {
            document.footer.push(line.to_string());
            continue;
        }

        match decode_line(line) {
            Some(row) => document.rows.push(row),
            None => {
                debug!("Passthrough header line: {:?}", line);
                document.header.push(line.to_string());
            }
        }
    }

    info!(
        "Parsed {} rows ({} header lines, {} footer lines)",
        document.rows.len(),
        document.header.len(),
        document.footer.len()
    );
    document
}

/// Render a document back to file content, newline-terminated.
///
/// An empty header is replaced by `default_header`, an empty footer by the terminator.
pub fn render_document(document: &Document, default_header: &str) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(
        document.header.len() + document.rows.len() + document.footer.len() + 2,
    );

    if document.header.is_empty() {
        lines.push(default_header.to_string());
    } else {
        lines.extend(document.header.iter().cloned());
    }

    lines.extend(document.rows.iter().map(encode_row));

    if document.footer.is_empty() {
        lines.push(TERMINATOR.to_string());
    } else {
        lines.extend(document.footer.iter().cloned());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Positions of rows whose encoded line does not decode back to the same row.
pub fn verify_round_trip(document: &Document) -> Vec<usize> {
    document
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| decode_line(&encode_row(row)).as_ref() != Some(*row))
        .map(|(position, _)| position)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BULL: &str = r#"0	1	"Bull Fighter"	6	100	0	16	20	6	0	28	6	3	0	1	5	400	1600	10	2	0	0	0	0	0	0	0	0"#;

    #[test]
    fn test_decode_record() {
        let row = decode_line(BULL).unwrap();
        assert_eq!(row.index(), "0");
        assert_eq!(row.get(Field::Rate), "1");
        assert_eq!(row.name(), "Bull Fighter");
        assert_eq!(row.get(Field::Level), "6");
        assert_eq!(row.get(Field::MaxLife), "100");
        assert_eq!(row.get(Field::MoveSpeed), "400");
        assert_eq!(row.get(Field::Resistance4), "0");
    }

    #[test]
    fn test_decode_pads_short_record() {
        let row = decode_line(r#"  12   1   "Hound"   9 140  "#).unwrap();
        assert_eq!(row.values().len(), FIELD_COUNT);
        assert_eq!(row.get(Field::Level), "9");
        assert_eq!(row.get(Field::MaxLife), "140");
        assert_eq!(row.get(Field::MaxMana), "0");
        assert_eq!(row.get(Field::Resistance4), "0");
    }

    #[test]
    fn test_decode_truncates_long_record() {
        let extra: Vec<String> = (0..40).map(|n| n.to_string()).collect();
        let line = format!(r#"3 1 "Spider" {}"#, extra.join(" "));
        let row = decode_line(&line).unwrap();
        assert_eq!(row.values().len(), FIELD_COUNT);
        assert_eq!(row.get(Field::Level), "0");
        assert_eq!(row.get(Field::Resistance4), "24");
    }

    #[test]
    fn test_decode_rejects_passthrough() {
        assert!(decode_line("").is_none());
        assert!(decode_line("   ").is_none());
        assert!(decode_line("//0 1 \"Commented\" 5").is_none());
        assert!(decode_line("end").is_none());
        assert!(decode_line("  END  ").is_none());
        assert!(decode_line(r#"0 "Bull" 6 100"#).is_none());
        assert!(decode_line(r#"0 1 "Bull 6 100"#).is_none());
        assert!(decode_line(r#"0 1 "" 6 100"#).is_none());
        assert!(decode_line("Monster list 2 3 4").is_none());
        assert!(decode_line(r#"-1 1 "Negative" 6"#).is_none());
    }

    #[test]
    fn test_encode_layout() {
        let row = decode_line(BULL).unwrap();
        let line = encode_row(&row);
        assert!(line.starts_with("0       1       \"Bull Fighter\"                     6 100 0"));
        assert!(line.ends_with("0 0 0 0"));
    }

    #[test]
    fn test_round_trip() {
        let lines = [
            BULL,
            r#"45 1 "Golden Budge Dragon" 30 1200 0 80 95 40 0 180 30 3 0 1 5 400 1400 10 2 0 0 0 0 0 0 0 0"#,
            r#"7 1 "Giant" 20"#,
            r#"8 2 "Decimal Beast" 10 99.5 0 1.25"#,
        ];
        for line in lines {
            let row = decode_line(line).unwrap();
            assert_eq!(decode_line(&encode_row(&row)), Some(row));
        }
    }

    #[test]
    fn test_round_trip_overlong_columns() {
        let mut row = Row::zeroed();
        row.set(Field::Index, "123456789012");
        row.set(Field::Rate, "987654321");
        row.set(Field::Name, "An Extremely Long Monster Name That Overflows");
        let line = encode_row(&row);
        assert_eq!(decode_line(&line), Some(row));
    }

    #[test]
    fn test_parse_document_sections() {
        let text = format!(
            "// Monster.txt\n\n{}\n// mid comment\n{}\n{}\nend\n// trailing\n",
            BULL, r#"0 1 "Bull 6 100"#, r#"1 1 "Hound" 9 140"#
        );
        let doc = parse_document(&text);

        assert_eq!(
            doc.header,
            vec!["// Monster.txt", "", "// mid comment", r#"0 1 "Bull 6 100"#]
        );
        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.footer, vec!["end", "// trailing"]);
    }

    #[test]
    fn test_records_after_terminator_stay_in_footer() {
        let text = format!(
            "{}\n{}\n  End \n{}\n",
            BULL, r#"1 1 "Hound" 9 140"#, r#"5 1 "Ghost" 1 2 3"#
        );
        let doc = parse_document(&text);

        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.footer, vec!["  End ", r#"5 1 "Ghost" 1 2 3"#]);
    }

    #[test]
    fn test_render_synthesizes_header_and_footer() {
        let mut doc = Document::new();
        doc.rows.push(decode_line(BULL).unwrap());
        let text = render_document(&doc, DEFAULT_HEADER);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], DEFAULT_HEADER);
        assert_eq!(lines[2], "end");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_render_then_parse_preserves_rows() {
        let text = format!(
            "// header\n{}\n{}\nend\n// footer\n",
            BULL, r#"2 1 "Budge Dragon" 4 80 0 12 15"#
        );
        let doc = parse_document(&text);
        let reparsed = parse_document(&render_document(&doc, DEFAULT_HEADER));

        assert_eq!(reparsed, doc);
        assert!(verify_round_trip(&doc).is_empty());
    }

    #[test]
    fn test_verify_round_trip_flags_bad_rows() {
        let mut doc = Document::new();
        doc.rows.push(decode_line(BULL).unwrap());
        let mut bad = Row::zeroed();
        bad.set(Field::MaxLife, "10 20");
        doc.rows.push(bad);

        assert_eq!(verify_round_trip(&doc), vec![1]);
    }
}
