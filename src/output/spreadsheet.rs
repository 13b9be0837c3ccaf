//! XLSX encoding of the record table

use crate::extract::Record;
use crate::output::table::cell_text;
use crate::output::OutputResult;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Writes the batch as a single-sheet workbook with a header row
///
/// The workbook is OOXML regardless of whether the path says `.xls` or
/// `.xlsx`; modern spreadsheet applications open either.
pub(crate) fn write_workbook(
    path: &Path,
    columns: &[String],
    records: &[Record],
) -> OutputResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (row, record) in records.iter().enumerate() {
        for (col, name) in columns.iter().enumerate() {
            let text = cell_text(record.get(name));
            if !text.is_empty() {
                worksheet.write_string(row as u32 + 1, col as u16, &text)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
