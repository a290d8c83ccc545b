//! Base workbook loading: .xlsx -> [`RawTable`] and passthrough grids.

use crate::error::{DashError, DashResult};
use crate::types::{columns, Cell, RawTable};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the base workbook with calamine.
pub struct WorkbookReader {
    path: PathBuf,
}

impl WorkbookReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the named sheet into a [`RawTable`].
    ///
    /// Headers with embedded line breaks are flattened to
    /// single-space-separated names, then the fixed sales schema is
    /// validated. Rows that are entirely empty are dropped.
    pub fn load_sheet(&self, sheet: &str) -> DashResult<RawTable> {
        let mut workbook = self.open()?;

        let names = workbook.sheet_names().to_vec();
        if !names.iter().any(|n| n == sheet) {
            return Err(DashError::SheetNotFound {
                name: sheet.to_string(),
                available: names,
            });
        }

        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| DashError::Load(format!("failed to read sheet '{sheet}': {e}")))?;

        let (height, width) = range.get_size();
        if height == 0 {
            return Err(DashError::Load(format!("sheet '{sheet}' is empty")));
        }

        let headers: Vec<String> = (0..width)
            .map(|col| match range.get((0, col)) {
                Some(cell) => normalize_header(&cell.to_string()),
                None => format!("col_{col}"),
            })
            .collect();

        for required in columns::REQUIRED {
            if !headers.iter().any(|h| h == required) {
                return Err(DashError::Schema(format!(
                    "required column '{}' missing from sheet '{}' (found: {:?})",
                    required, sheet, headers
                )));
            }
        }

        let mut table = RawTable::new(headers);
        for row in 1..height {
            let cells: Vec<Cell> = (0..width)
                .map(|col| convert_cell(range.get((row, col))))
                .collect();
            if cells.iter().all(|c| matches!(c, Cell::Empty)) {
                continue;
            }
            table.rows.push(cells);
        }

        debug!(
            sheet,
            rows = table.rows.len(),
            columns = table.headers.len(),
            "loaded base sheet"
        );

        Ok(table)
    }

    /// Read every sheet not named in `skip` as a value grid, in workbook
    /// order. Used to carry the base workbook's other sheets into the
    /// output unchanged.
    pub fn passthrough_sheets(&self, skip: &[&str]) -> DashResult<Vec<(String, Vec<Vec<Cell>>)>> {
        let mut workbook = self.open()?;
        let names = workbook.sheet_names().to_vec();

        let mut sheets = Vec::new();
        for name in names {
            if skip.iter().any(|s| *s == name) {
                continue;
            }
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| DashError::Load(format!("failed to read sheet '{name}': {e}")))?;
            sheets.push((name, grid_from_range(&range)));
        }

        debug!(sheets = sheets.len(), "collected passthrough sheets");
        Ok(sheets)
    }

    fn open(&self) -> DashResult<Xlsx<std::io::BufReader<std::fs::File>>> {
        if !self.path.exists() {
            return Err(DashError::FileNotFound(self.path.clone()));
        }
        open_workbook(&self.path)
            .map_err(|e| DashError::Load(format!("failed to open '{}': {e}", self.path.display())))
    }
}

/// Collapse embedded line breaks (and runs of whitespace) to single spaces
/// so downstream lookups use a flat namespace.
fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn convert_cell(data: Option<&Data>) -> Cell {
    match data {
        None | Some(Data::Empty) => Cell::Empty,
        Some(Data::Float(f)) => Cell::Number(*f),
        Some(Data::Int(i)) => Cell::Number(*i as f64),
        Some(Data::Bool(b)) => Cell::Bool(*b),
        Some(Data::String(s)) => Cell::Text(s.clone()),
        Some(Data::DateTime(dt)) => Cell::Number(dt.as_f64()),
        Some(other) => Cell::Text(other.to_string()),
    }
}

fn grid_from_range(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let (height, width) = range.get_size();
    (0..height)
        .map(|row| {
            (0..width)
                .map(|col| convert_cell(range.get((row, col))))
                .collect()
        })
        .collect()
}
