use std::fs;
use std::path::{Path, PathBuf};

use calamine::Data;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::reader::{cell_text, SourceSheet};
use crate::conditions::Value;
use crate::engine::{ResultTable, MAX_RESULT_ROWS};
use crate::error::PersistenceError;

/// columns a single xlsx worksheet holds
pub const MAX_RESULT_COLUMNS: usize = 16_384;

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const DURATION_FORMAT: &str = "[h]:mm:ss";

/// write the source grid and the result table as two worksheets of one workbook
///
/// the source sheet is written back unmodified under its own name; the result
/// sheet gets a bold header row followed by one row per combination
pub fn write_workbook(
    path: &Path,
    source: &SourceSheet,
    result_sheet: &str,
    table: &ResultTable,
) -> Result<(), PersistenceError> {
    ensure_fits(Some(table.row_count()), table.columns().len())?;

    let wrap = |source: XlsxError| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    workbook.push_worksheet(source_worksheet(source).map_err(wrap)?);
    workbook.push_worksheet(result_worksheet(result_sheet, table).map_err(wrap)?);
    workbook.save(path).map_err(wrap)?;

    Ok(())
}

/// fail unless a result of `rows` data rows and `columns` columns fits one worksheet
///
/// `None` rows means the count overflowed
pub fn ensure_fits(rows: Option<usize>, columns: usize) -> Result<(), PersistenceError> {
    match rows {
        None => {
            return Err(PersistenceError::UncountableRows {
                limit: MAX_RESULT_ROWS,
            })
        }
        Some(rows) if rows > MAX_RESULT_ROWS => {
            return Err(PersistenceError::TooManyRows {
                rows,
                limit: MAX_RESULT_ROWS,
            })
        }
        Some(_) => {}
    }
    if columns > MAX_RESULT_COLUMNS {
        return Err(PersistenceError::TooManyColumns {
            columns,
            limit: MAX_RESULT_COLUMNS,
        });
    }
    Ok(())
}

fn source_worksheet(source: &SourceSheet) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(&source.name)?;

    let datetime = Format::new().set_num_format(DATETIME_FORMAT);
    let duration = Format::new().set_num_format(DURATION_FORMAT);
    let (row0, col0) = source.origin;

    for (r, row) in source.grid.iter().enumerate() {
        let r = row0 + r as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = col0 as u16 + c as u16;
            match cell {
                Data::Empty => {}
                Data::String(s) => {
                    sheet.write_string(r, c, s)?;
                }
                Data::Float(f) => {
                    sheet.write_number(r, c, *f)?;
                }
                Data::Int(i) => {
                    sheet.write_number(r, c, *i as f64)?;
                }
                Data::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                Data::DateTime(dt) if dt.is_duration() => {
                    sheet.write_number_with_format(r, c, dt.as_f64(), &duration)?;
                }
                // through chrono so 1904-based workbooks land on the same date
                Data::DateTime(dt) => match dt.as_datetime() {
                    Some(moment) => {
                        sheet.write_datetime_with_format(r, c, &moment, &datetime)?;
                    }
                    None => {
                        sheet.write_number_with_format(r, c, dt.as_f64(), &datetime)?;
                    }
                },
                other => {
                    sheet.write_string(r, c, cell_text(other))?;
                }
            }
        }
    }

    Ok(sheet)
}

fn result_worksheet(name: &str, table: &ResultTable) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(name)?;

    let header = Format::new().set_bold();
    for (c, column) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, column, &header)?;
    }

    for (r, row) in table.rows().enumerate() {
        let r = r as u32 + 1;
        for (c, value) in row.into_iter().enumerate() {
            let c = c as u16;
            match value {
                Value::Null => {}
                Value::Number(n) => {
                    sheet.write_number(r, c, *n as f64)?;
                }
                Value::Float(f) => {
                    sheet.write_number(r, c, *f)?;
                }
                Value::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                other => {
                    sheet.write_string(r, c, other.to_cell_text())?;
                }
            }
        }
    }

    Ok(sheet)
}

/// copy the artifact into `dir`, creating it if needed; returns the copy's path
pub fn copy_to_dir(path: &Path, dir: &Path) -> Result<PathBuf, PersistenceError> {
    let file_name = path.file_name().unwrap_or(path.as_os_str());
    let target = dir.join(file_name);

    let copy_error = |source: std::io::Error| PersistenceError::Copy {
        from: path.to_path_buf(),
        to: target.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(copy_error)?;
    fs::copy(path, &target).map_err(copy_error)?;

    Ok(target)
}
