use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::engine::{SourceRow, CONDITION_COLUMN, POSSIBLE_VALUES_COLUMN, PROPERTY_NAME_COLUMN};
use crate::error::FormatError;

/// raw cell grid of the property worksheet, header row first
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSheet {
    pub name: String,
    pub grid: Vec<Vec<Data>>,
    /// (row, column) of the grid's top-left cell in the worksheet
    pub origin: (u32, u32),
}

impl SourceSheet {
    pub fn new(name: impl Into<String>, grid: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            grid,
            origin: (0, 0),
        }
    }

    pub fn with_origin(mut self, origin: (u32, u32)) -> Self {
        self.origin = origin;
        self
    }

    /// header cells as text
    pub fn headers(&self) -> Vec<String> {
        self.grid
            .first()
            .map(|row| row.iter().map(|c| cell_text(c).trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// data rows keyed by the three property columns
    ///
    /// a sheet with no cells at all has no rows; a sheet with a header that
    /// lacks any of the required columns is malformed
    pub fn rows(&self) -> Result<Vec<SourceRow>, FormatError> {
        if self.grid.is_empty() {
            return Ok(Vec::new());
        }

        let headers = self.headers();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| FormatError::MissingColumn(name.to_string()))
        };
        let name_col = column(PROPERTY_NAME_COLUMN)?;
        let values_col = column(POSSIBLE_VALUES_COLUMN)?;
        let condition_col = column(CONDITION_COLUMN)?;

        let cell = |row: &[Data], col: usize| row.get(col).map(cell_text).unwrap_or_default();

        Ok(self.grid[1..]
            .iter()
            .map(|row| SourceRow {
                property_name: cell(row, name_col),
                possible_values: cell(row, values_col),
                condition: cell(row, condition_col),
            })
            .collect())
    }
}

/// render a cell the way it reads in the sheet; integral floats lose `.0`
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// read the property worksheet of an xlsx/xls/ods workbook
pub fn read_source(path: &Path, sheet: &str) -> Result<SourceSheet, FormatError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| FormatError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;

    if !workbook.sheet_names().iter().any(|n| n == sheet) {
        return Err(FormatError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| FormatError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;

    let origin = range.start().unwrap_or((0, 0));
    let grid = range.rows().map(|row| row.to_vec()).collect();

    Ok(SourceSheet::new(sheet, grid).with_origin(origin))
}
