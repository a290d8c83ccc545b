//! Report workbook rendering: calculations blocks, dashboard, charts.

use super::{CALC_SHEET, DASHBOARD_SHEET};
use crate::error::{DashError, DashResult};
use crate::metrics::{DashboardMetrics, GroupedMetric};
use crate::types::{columns, Cell};
use rust_xlsxwriter::{
    Chart, ChartType, Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};
use std::path::Path;
use tracing::debug;

// Block titles on the calculations sheet, kept in the base workbook's language.
const TITLE_ANNUAL_TOTAL: &str = "Faturamento Anual Total";
const TITLE_ANNUAL_BY_RENEWAL: &str = "Faturamento Anual por Auto Renova\u{e7}\u{e3}o";
const TITLE_EA_PLAY_BY_PLAN: &str = "Faturamento EA Play por Plano";
const TITLE_MINECRAFT_BY_PLAN: &str = "Faturamento Minecraft por Plano";
const TITLE_PLAN_DISTRIBUTION: &str = "Distribui\u{e7}\u{e3}o de Assinantes por Plano";
const TITLE_KEY_METRICS: &str = "M\u{e9}tricas Chave";
const LABEL_GRAND_TOTAL: &str = "Total Geral";
const LABEL_SUBSCRIBERS: &str = "Total de Assinantes";
const LABEL_ARPU: &str = "Receita M\u{e9}dia por Assinante (ARPU)";

const DASHBOARD_TITLE: &str = "XBOX GAME PASS SUBSCRIPTIONS SALES";
const CHART1_X_TITLE: &str = "Auto Renova\u{e7}\u{e3}o";
const CHART1_Y_TITLE: &str = "Valor (R$)";
const CHART2_X_TITLE: &str = "Plano";
const CHART2_Y_TITLE: &str = "Contagem";

const CURRENCY_FORMAT: &str = "\"R$\"#,##0.00";
const COUNT_FORMAT: &str = "#,##0";

const BANNER_FILL: u32 = 0x9BC848;
const CARD_FILL: u32 = 0xE8E6E9;

// 15cm x 10cm chart footprint
const CHART_WIDTH_PX: u32 = 567;
const CHART_HEIGHT_PX: u32 = 378;

/// Where a titled block landed on the calculations sheet (0-based rows).
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub title: String,
    pub header_row: u32,
    pub first_data_row: u32,
    pub last_data_row: u32,
}

/// Layout descriptor for the calculations sheet, produced by the table
/// writer and consumed by the chart step. Charts resolve their source
/// ranges through this instead of hardcoding row numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalcLayout {
    blocks: Vec<BlockLayout>,
}

impl CalcLayout {
    pub fn block(&self, title: &str) -> Option<&BlockLayout> {
        self.blocks.iter().find(|b| b.title == title)
    }

    fn push(&mut self, block: BlockLayout) {
        self.blocks.push(block);
    }
}

/// Tracks the longest stringified value per column for autosizing.
struct ColumnWidths {
    max: Vec<usize>,
}

impl ColumnWidths {
    fn new() -> Self {
        Self { max: Vec::new() }
    }

    fn note(&mut self, col: u16, text: &str) {
        let col = col as usize;
        if self.max.len() <= col {
            self.max.resize(col + 1, 0);
        }
        self.max[col] = self.max[col].max(text.chars().count());
    }

    fn apply(&self, sheet: &mut Worksheet) -> DashResult<()> {
        for (col, len) in self.max.iter().enumerate() {
            sheet
                .set_column_width(col as u16, (*len + 2) as f64)
                .map_err(report_err)?;
        }
        Ok(())
    }
}

/// Writes the output workbook: passthrough sheets, the calculations
/// sheet, and the dashboard sheet with cards and charts.
pub struct ReportWriter {
    metrics: DashboardMetrics,
}

impl ReportWriter {
    pub fn new(metrics: DashboardMetrics) -> Self {
        Self { metrics }
    }

    /// Compose the full workbook and save it to `output`, overwriting any
    /// existing file there.
    pub fn save(&self, passthrough: &[(String, Vec<Vec<Cell>>)], output: &Path) -> DashResult<()> {
        let mut workbook = Workbook::new();

        for (name, grid) in passthrough {
            write_passthrough(&mut workbook, name, grid)?;
        }

        let layout = self.write_calculations(&mut workbook)?;
        self.write_dashboard(&mut workbook, &layout)?;

        workbook.save(output).map_err(|e| {
            DashError::Report(format!("failed to save '{}': {e}", output.display()))
        })?;

        debug!(output = %output.display(), "report workbook saved");
        Ok(())
    }

    /// Lay out the six metric blocks and return where each one landed.
    fn write_calculations(&self, workbook: &mut Workbook) -> DashResult<CalcLayout> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(CALC_SHEET).map_err(report_err)?;

        let bold = Format::new().set_bold();
        let currency = Format::new().set_num_format(CURRENCY_FORMAT);
        let count = Format::new().set_num_format(COUNT_FORMAT);

        let m = &self.metrics;
        let mut widths = ColumnWidths::new();
        let mut layout = CalcLayout::default();
        let mut row: u32 = 0;

        // Annual revenue, a single labelled scalar
        write_text(sheet, &mut widths, row, 0, TITLE_ANNUAL_TOTAL, Some(&bold))?;
        write_text(sheet, &mut widths, row + 1, 0, columns::TOTAL_VALUE, Some(&bold))?;
        write_currency(sheet, &mut widths, row + 1, 1, m.annual_revenue, &currency)?;
        layout.push(BlockLayout {
            title: TITLE_ANNUAL_TOTAL.to_string(),
            header_row: row,
            first_data_row: row + 1,
            last_data_row: row + 1,
        });
        row += 3;

        row = write_grouped_block(
            sheet,
            &mut widths,
            &mut layout,
            row,
            TITLE_ANNUAL_BY_RENEWAL,
            &m.annual_by_auto_renewal,
            Some(m.annual_revenue),
            &bold,
            &currency,
        )?;
        row = write_grouped_block(
            sheet,
            &mut widths,
            &mut layout,
            row,
            TITLE_EA_PLAY_BY_PLAN,
            &m.ea_play_by_plan,
            Some(m.ea_play_revenue),
            &bold,
            &currency,
        )?;
        row = write_grouped_block(
            sheet,
            &mut widths,
            &mut layout,
            row,
            TITLE_MINECRAFT_BY_PLAN,
            &m.minecraft_by_plan,
            Some(m.minecraft_revenue),
            &bold,
            &currency,
        )?;
        row = write_grouped_block(
            sheet,
            &mut widths,
            &mut layout,
            row,
            TITLE_PLAN_DISTRIBUTION,
            &m.subscribers_by_plan,
            None,
            &bold,
            &currency,
        )?;

        // Key metrics
        write_text(sheet, &mut widths, row, 0, TITLE_KEY_METRICS, Some(&bold))?;
        write_text(sheet, &mut widths, row + 1, 0, LABEL_SUBSCRIBERS, Some(&bold))?;
        sheet
            .write_number_with_format(row + 1, 1, m.total_subscribers as f64, &count)
            .map_err(report_err)?;
        widths.note(1, &format_count(m.total_subscribers));
        write_text(sheet, &mut widths, row + 2, 0, LABEL_ARPU, Some(&bold))?;
        write_currency(sheet, &mut widths, row + 2, 1, m.arpu, &currency)?;
        layout.push(BlockLayout {
            title: TITLE_KEY_METRICS.to_string(),
            header_row: row,
            first_data_row: row + 1,
            last_data_row: row + 2,
        });

        widths.apply(sheet)?;

        debug!(blocks = layout.blocks.len(), "calculations sheet written");
        Ok(layout)
    }

    /// Banner, three metric cards, and the two column charts.
    fn write_dashboard(&self, workbook: &mut Workbook, layout: &CalcLayout) -> DashResult<()> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(DASHBOARD_SHEET).map_err(report_err)?;

        let banner = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(BANNER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        sheet
            .merge_range(0, 0, 1, 5, DASHBOARD_TITLE, &banner)
            .map_err(report_err)?;

        let card = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(CARD_FILL))
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();

        let m = &self.metrics;
        let cards = [
            (LABEL_SUBSCRIBERS, format_count(m.total_subscribers), 0u16),
            (TITLE_ANNUAL_TOTAL, format_currency(m.annual_revenue), 2),
            (LABEL_ARPU, format_currency(m.arpu), 4),
        ];
        // 3 rows x 2 columns per card; the merged cell carries the label,
        // a blank line, then the pre-formatted value
        for (label, value, col) in &cards {
            let text = format!("{label}\n\n{value}");
            sheet
                .merge_range(3, *col, 5, col + 1, &text, &card)
                .map_err(report_err)?;
        }

        for col in 0..6u16 {
            let width = if col % 2 == 0 { 15.0 } else { 1.0 };
            sheet.set_column_width(col, width).map_err(report_err)?;
        }

        let renewal = layout.block(TITLE_ANNUAL_BY_RENEWAL).ok_or_else(|| {
            DashError::Report(format!(
                "missing calculations block '{TITLE_ANNUAL_BY_RENEWAL}'"
            ))
        })?;
        let chart = column_chart(
            renewal,
            TITLE_ANNUAL_BY_RENEWAL,
            CHART1_X_TITLE,
            CHART1_Y_TITLE,
            &m.annual_by_auto_renewal.value_header,
        );
        sheet.insert_chart(7, 0, &chart).map_err(report_err)?;

        let distribution = layout.block(TITLE_PLAN_DISTRIBUTION).ok_or_else(|| {
            DashError::Report(format!(
                "missing calculations block '{TITLE_PLAN_DISTRIBUTION}'"
            ))
        })?;
        let chart = column_chart(
            distribution,
            TITLE_PLAN_DISTRIBUTION,
            CHART2_X_TITLE,
            CHART2_Y_TITLE,
            &m.subscribers_by_plan.value_header,
        );
        sheet.insert_chart(7, 6, &chart).map_err(report_err)?;

        Ok(())
    }
}

/// Write one grouped metric as a titled block. Returns the start row of
/// the next block (one blank row in between).
#[allow(clippy::too_many_arguments)]
fn write_grouped_block(
    sheet: &mut Worksheet,
    widths: &mut ColumnWidths,
    layout: &mut CalcLayout,
    start: u32,
    title: &str,
    metric: &GroupedMetric,
    grand_total: Option<f64>,
    bold: &Format,
    currency: &Format,
) -> DashResult<u32> {
    write_text(sheet, widths, start, 0, title, Some(bold))?;
    write_text(sheet, widths, start + 1, 0, &metric.key_header, Some(bold))?;
    write_text(sheet, widths, start + 1, 1, &metric.value_header, Some(bold))?;

    let first_data_row = start + 2;
    let value_is_currency = is_currency_column(&metric.value_header);
    for (i, (key, value)) in metric.rows.iter().enumerate() {
        let r = first_data_row + i as u32;
        write_text(sheet, widths, r, 0, key, None)?;
        if value_is_currency {
            write_currency(sheet, widths, r, 1, *value, currency)?;
        } else {
            sheet.write_number(r, 1, *value).map_err(report_err)?;
            widths.note(1, &Cell::Number(*value).display());
        }
    }

    let last_data_row = if metric.rows.is_empty() {
        first_data_row
    } else {
        first_data_row + metric.rows.len() as u32 - 1
    };

    if let Some(total) = grand_total {
        write_text(sheet, widths, last_data_row, 2, LABEL_GRAND_TOTAL, Some(bold))?;
        write_currency(sheet, widths, last_data_row, 3, total, currency)?;
    }

    layout.push(BlockLayout {
        title: title.to_string(),
        header_row: start + 1,
        first_data_row,
        last_data_row,
    });

    Ok(last_data_row + 2)
}

/// Build one of the dashboard's column charts from a calculations block.
fn column_chart(
    block: &BlockLayout,
    title: &str,
    x_title: &str,
    y_title: &str,
    series_name: &str,
) -> Chart {
    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_name(series_name)
        .set_categories((CALC_SHEET, block.first_data_row, 0, block.last_data_row, 0))
        .set_values((CALC_SHEET, block.first_data_row, 1, block.last_data_row, 1));
    chart.title().set_name(title);
    chart.x_axis().set_name(x_title);
    chart.y_axis().set_name(y_title);
    chart.set_width(CHART_WIDTH_PX).set_height(CHART_HEIGHT_PX);
    chart
}

/// Copy a sheet of plain values into the output workbook.
fn write_passthrough(workbook: &mut Workbook, name: &str, grid: &[Vec<Cell>]) -> DashResult<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name).map_err(report_err)?;

    for (r, cells) in grid.iter().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            let (row, col) = (r as u32, c as u16);
            match cell {
                Cell::Empty => {}
                Cell::Number(n) => {
                    sheet.write_number(row, col, *n).map_err(report_err)?;
                }
                Cell::Text(s) => {
                    sheet.write_string(row, col, s).map_err(report_err)?;
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(row, col, *b).map_err(report_err)?;
                }
            }
        }
    }
    Ok(())
}

fn write_text(
    sheet: &mut Worksheet,
    widths: &mut ColumnWidths,
    row: u32,
    col: u16,
    text: &str,
    format: Option<&Format>,
) -> DashResult<()> {
    match format {
        Some(f) => sheet
            .write_string_with_format(row, col, text, f)
            .map_err(report_err)?,
        None => sheet.write_string(row, col, text).map_err(report_err)?,
    };
    widths.note(col, text);
    Ok(())
}

fn write_currency(
    sheet: &mut Worksheet,
    widths: &mut ColumnWidths,
    row: u32,
    col: u16,
    value: f64,
    format: &Format,
) -> DashResult<()> {
    sheet
        .write_number_with_format(row, col, value, format)
        .map_err(report_err)?;
    widths.note(col, &format_currency(value));
    Ok(())
}

/// True when the column carries the currency mask.
fn is_currency_column(name: &str) -> bool {
    name.contains("Value") || name.contains("Price")
}

/// Display form of a monetary value, matching the sheet's currency mask.
fn format_currency(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}R${}.{frac}", group_thousands(int_part))
}

fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn report_err(e: XlsxError) -> DashError {
    DashError::Report(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregate;
    use crate::types::{SalesRecord, SalesTable};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn record(id: &str, plan: &str, sub_type: &str, renewal: &str, total: f64) -> SalesRecord {
        SalesRecord {
            subscriber_id: id.to_string(),
            plan: plan.to_string(),
            subscription_type: sub_type.to_string(),
            auto_renewal: renewal.to_string(),
            subscription_price: total,
            ea_play_price: 1.0,
            minecraft_price: 2.0,
            coupon_value: 0.0,
            total_value: total,
        }
    }

    fn test_metrics() -> DashboardMetrics {
        let table = SalesTable {
            records: vec![
                record("1", "Ultimate", "Annual", "Yes", 10.0),
                record("2", "Ultimate", "Annual", "No", 5.0),
                record("3", "Core", "Monthly", "Yes", 3.0),
            ],
        };
        aggregate(&table).unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "R$0.00");
        assert_eq!(format_currency(15.0), "R$15.00");
        assert_eq!(format_currency(1234.5), "R$1,234.50");
        assert_eq!(format_currency(1234567.891), "R$1,234,567.89");
        assert_eq!(format_currency(-42.0), "-R$42.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1200), "1,200");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_is_currency_column() {
        assert!(is_currency_column("Total Value"));
        assert!(is_currency_column("EA Play Season Pass Price"));
        assert!(!is_currency_column("Count"));
        assert!(!is_currency_column("Plan"));
    }

    #[test]
    fn test_calculations_layout() {
        let writer = ReportWriter::new(test_metrics());
        let mut workbook = Workbook::new();
        let layout = writer.write_calculations(&mut workbook).unwrap();

        // Scalar block: title row 0, value row 1, blank row 2
        let annual = layout.block(TITLE_ANNUAL_TOTAL).unwrap();
        assert_eq!(annual.first_data_row, 1);

        // Renewal breakdown: title 3, header 4, data 5..6 (Yes/No)
        let renewal = layout.block(TITLE_ANNUAL_BY_RENEWAL).unwrap();
        assert_eq!(renewal.header_row, 4);
        assert_eq!(renewal.first_data_row, 5);
        assert_eq!(renewal.last_data_row, 6);

        // Two plans per breakdown block, one blank row between blocks
        let ea_play = layout.block(TITLE_EA_PLAY_BY_PLAN).unwrap();
        assert_eq!(ea_play.header_row, 9);
        assert_eq!(ea_play.last_data_row, 11);

        let minecraft = layout.block(TITLE_MINECRAFT_BY_PLAN).unwrap();
        assert_eq!(minecraft.first_data_row, 15);

        let distribution = layout.block(TITLE_PLAN_DISTRIBUTION).unwrap();
        assert_eq!(distribution.first_data_row, 20);
        assert_eq!(distribution.last_data_row, 21);

        let key_metrics = layout.block(TITLE_KEY_METRICS).unwrap();
        assert_eq!(key_metrics.first_data_row, 24);
        assert_eq!(key_metrics.last_data_row, 25);
    }

    #[test]
    fn test_layout_tracks_group_count() {
        let table = SalesTable {
            records: vec![
                record("1", "Ultimate", "Annual", "Yes", 10.0),
                record("2", "Core", "Annual", "No", 5.0),
                record("3", "Standard", "Annual", "Yes", 3.0),
            ],
        };
        let writer = ReportWriter::new(aggregate(&table).unwrap());
        let mut workbook = Workbook::new();
        let layout = writer.write_calculations(&mut workbook).unwrap();

        // Three plans -> three data rows per plan block
        let ea_play = layout.block(TITLE_EA_PLAY_BY_PLAN).unwrap();
        assert_eq!(ea_play.last_data_row - ea_play.first_data_row + 1, 3);
    }

    #[test]
    fn test_save_produces_workbook() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("dashboard.xlsx");

        let writer = ReportWriter::new(test_metrics());
        let passthrough = vec![(
            "Assets".to_string(),
            vec![vec![Cell::Text("logo".to_string()), Cell::Number(1.0)]],
        )];
        writer.save(&passthrough, &output).unwrap();

        assert!(output.exists());
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("dashboard.xlsx");
        std::fs::write(&output, b"stale").unwrap();

        let writer = ReportWriter::new(test_metrics());
        writer.save(&[], &output).unwrap();

        assert!(std::fs::metadata(&output).unwrap().len() > 5);
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let writer = ReportWriter::new(test_metrics());
        let result = writer.save(&[], Path::new("/nonexistent/dir/out.xlsx"));
        assert!(result.is_err());
    }
}
