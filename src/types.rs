//! Core table and record types for the sales pipeline.

use crate::error::{DashError, DashResult};

/// Column names of the sales sheet, after header normalization.
pub mod columns {
    pub const SUBSCRIBER_ID: &str = "Subscriber ID";
    pub const PLAN: &str = "Plan";
    pub const SUBSCRIPTION_TYPE: &str = "Subscription Type";
    pub const AUTO_RENEWAL: &str = "Auto Renewal";
    pub const SUBSCRIPTION_PRICE: &str = "Subscription Price";
    pub const EA_PLAY_PRICE: &str = "EA Play Season Pass Price";
    pub const MINECRAFT_PRICE: &str = "Minecraft Season Pass Price";
    pub const COUPON_VALUE: &str = "Coupon Value";
    pub const TOTAL_VALUE: &str = "Total Value";
    pub const COUNT: &str = "Count";

    /// Every column the sales sheet must provide.
    pub const REQUIRED: [&str; 9] = [
        SUBSCRIBER_ID,
        PLAN,
        SUBSCRIPTION_TYPE,
        AUTO_RENEWAL,
        SUBSCRIPTION_PRICE,
        EA_PLAY_PRICE,
        MINECRAFT_PRICE,
        COUPON_VALUE,
        TOTAL_VALUE,
    ];

    /// Columns coerced to numbers by the cleaner.
    pub const NUMERIC: [&str; 5] = [
        SUBSCRIPTION_PRICE,
        EA_PLAY_PRICE,
        MINECRAFT_PRICE,
        COUPON_VALUE,
        TOTAL_VALUE,
    ];
}

/// Subscription type that counts toward annual revenue.
pub const ANNUAL: &str = "Annual";

/// A single cell value read from the base workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the cell the way it reads in the sheet. Numbers drop a
    /// trailing `.0` so identifiers like `5100` round-trip cleanly.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

/// Tabular data with a flat header namespace: one header row plus
/// ordered data rows, all rows the same width as the header.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// One subscription transaction, bound to the fixed column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub subscriber_id: String,
    pub plan: String,
    pub subscription_type: String,
    pub auto_renewal: String,
    pub subscription_price: f64,
    pub ea_play_price: f64,
    pub minecraft_price: f64,
    pub coupon_value: f64,
    pub total_value: f64,
}

/// The cleaned sales table as typed records.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTable {
    pub records: Vec<SalesRecord>,
}

impl SalesTable {
    /// Bind a cleaned [`RawTable`] to the fixed schema.
    ///
    /// Fails with a `Schema` error naming the first missing column. Price
    /// cells that are not numbers fall back to 0, matching the cleaner's
    /// zero-fill policy.
    pub fn from_raw(table: &RawTable) -> DashResult<Self> {
        let idx = |name: &str| {
            table.column_index(name).ok_or_else(|| {
                DashError::Schema(format!(
                    "required column '{}' missing (found: {:?})",
                    name, table.headers
                ))
            })
        };

        let subscriber_id = idx(columns::SUBSCRIBER_ID)?;
        let plan = idx(columns::PLAN)?;
        let subscription_type = idx(columns::SUBSCRIPTION_TYPE)?;
        let auto_renewal = idx(columns::AUTO_RENEWAL)?;
        let subscription_price = idx(columns::SUBSCRIPTION_PRICE)?;
        let ea_play_price = idx(columns::EA_PLAY_PRICE)?;
        let minecraft_price = idx(columns::MINECRAFT_PRICE)?;
        let coupon_value = idx(columns::COUPON_VALUE)?;
        let total_value = idx(columns::TOTAL_VALUE)?;

        let number = |row: &[Cell], i: usize| row.get(i).and_then(Cell::as_f64).unwrap_or(0.0);
        let text = |row: &[Cell], i: usize| row.get(i).map(Cell::display).unwrap_or_default();

        let records = table
            .rows
            .iter()
            .map(|row| SalesRecord {
                subscriber_id: text(row, subscriber_id),
                plan: text(row, plan),
                subscription_type: text(row, subscription_type),
                auto_renewal: text(row, auto_renewal),
                subscription_price: number(row, subscription_price),
                ea_play_price: number(row, ea_play_price),
                minecraft_price: number(row, minecraft_price),
                coupon_value: number(row, coupon_value),
                total_value: number(row, total_value),
            })
            .collect();

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
