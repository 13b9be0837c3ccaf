//! CSV encoding of the record table

use crate::extract::Record;
use crate::output::table::cell_text;
use crate::output::OutputResult;
use std::path::Path;

/// Writes the batch as a CSV file with a header row
pub(crate) fn write_csv(path: &Path, columns: &[String], records: &[Record]) -> OutputResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(columns)?;
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| cell_text(record.get(column)))
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
