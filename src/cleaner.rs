//! Numeric coercion for the price columns of the sales sheet.
//!
//! The base workbook mixes real numbers, stringified numbers, blanks, and
//! a `-` placeholder in the same columns. Everything that does not parse
//! as a number becomes exactly 0, so downstream aggregation never sees a
//! missing value.

use crate::types::{Cell, RawTable};
use tracing::debug;

/// Placeholder token used in the base spreadsheet for "no value".
const PLACEHOLDER: &str = "-";

/// Coerce the designated columns of `table` to [`Cell::Number`].
///
/// Columns are handled independently; a column name without a matching
/// header is skipped (the loader has already validated the schema).
/// Idempotent: re-running on an already-clean table is a no-op.
pub fn coerce_numeric(table: &RawTable, columns: &[&str]) -> RawTable {
    let targets: Vec<usize> = columns
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();

    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, cell)| {
                    if targets.contains(&idx) {
                        coerce_cell(cell)
                    } else {
                        cell.clone()
                    }
                })
                .collect()
        })
        .collect();

    debug!(
        columns = targets.len(),
        rows = table.rows.len(),
        "coerced numeric columns"
    );

    RawTable {
        headers: table.headers.clone(),
        rows,
    }
}

fn coerce_cell(cell: &Cell) -> Cell {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Cell::Empty => 0.0,
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == PLACEHOLDER {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
    };
    Cell::Number(value)
}
