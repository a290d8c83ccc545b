//! Excel I/O for the dashboard pipeline.
//!
//! - Reader: base workbook (.xlsx) -> in-memory tables (calamine)
//! - Report: metrics -> styled output workbook with charts (rust_xlsxwriter)

mod reader;
mod report;

pub use reader::WorkbookReader;
pub use report::{BlockLayout, CalcLayout, ReportWriter};

/// Sheet holding the raw sales records in the base workbook.
pub const BASES_SHEET: &str = "B\u{333}ases";
/// Generated sheet with the titled metric blocks.
pub const CALC_SHEET: &str = "C\u{333}\u{e1}lculos";
/// Generated sheet with the banner, cards, and charts.
pub const DASHBOARD_SHEET: &str = "D\u{333}ashboard";
