//! Subdash - subscription sales dashboard generator
//!
//! This library reads the Game Pass sales base workbook, cleans the price
//! columns, aggregates revenue and subscriber metrics, and writes a styled
//! dashboard workbook (a calculations sheet of titled metric blocks plus a
//! dashboard sheet with metric cards and two column charts).
//!
//! # Pipeline
//!
//! Four pure stages, data flowing strictly forward:
//! load ([`excel::WorkbookReader`]) → clean ([`cleaner`]) → aggregate
//! ([`metrics`]) → render ([`excel::ReportWriter`]).
//!
//! # Example
//!
//! ```no_run
//! use subdash::cleaner;
//! use subdash::excel::{ReportWriter, WorkbookReader, BASES_SHEET, CALC_SHEET, DASHBOARD_SHEET};
//! use subdash::metrics::aggregate;
//! use subdash::types::{columns, SalesTable};
//! use std::path::Path;
//!
//! let reader = WorkbookReader::new("base.xlsx");
//! let raw = reader.load_sheet(BASES_SHEET)?;
//! let cleaned = cleaner::coerce_numeric(&raw, &columns::NUMERIC);
//! let table = SalesTable::from_raw(&cleaned)?;
//!
//! let metrics = aggregate(&table)?;
//! println!("Annual revenue: {}", metrics.annual_revenue);
//!
//! let passthrough = reader.passthrough_sheets(&[CALC_SHEET, DASHBOARD_SHEET])?;
//! ReportWriter::new(metrics).save(&passthrough, Path::new("dashboard_vendas_final.xlsx"))?;
//! # Ok::<(), subdash::DashError>(())
//! ```

pub mod cleaner;
pub mod cli;
pub mod error;
pub mod excel;
pub mod metrics;
pub mod types;

// Re-export commonly used types
pub use error::{DashError, DashResult};
pub use metrics::{DashboardMetrics, GroupedMetric};
pub use types::{Cell, RawTable, SalesRecord, SalesTable};
