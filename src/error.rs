use std::path::PathBuf;
use thiserror::Error;

pub type DashResult<T> = Result<T, DashError>;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input workbook not found: {0}")]
    FileNotFound(PathBuf),

    #[error("sheet '{name}' not found in workbook (available: {available:?})")]
    SheetNotFound { name: String, available: Vec<String> },

    #[error("failed to load workbook: {0}")]
    Load(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("no subscribers in input data, ARPU is undefined")]
    NoSubscribers,

    #[error("failed to write report: {0}")]
    Report(String),
}
