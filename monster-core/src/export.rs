//! CSV export of monster rows.

use crate::error::Result;
use crate::models::{Field, Row};
use std::io::Write;
use std::path::Path;

/// Write a header record of field names followed by one record per row.
pub fn export_csv<W: Write>(rows: &[Row], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(Field::ALL.iter().map(|f| f.name()))?;
    for row in rows {
        csv_writer.write_record(row.values())?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_csv_file(rows: &[Row], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    export_csv(rows, file)?;
    tracing::info!("Exported {} monsters to {:?}", rows.len(), path);
    Ok(())
}
