//! CLI command handlers

use crate::cleaner;
use crate::error::DashResult;
use crate::excel::{ReportWriter, WorkbookReader, CALC_SHEET, DASHBOARD_SHEET};
use crate::metrics::{aggregate, DashboardMetrics, GroupedMetric};
use crate::types::{columns, RawTable, SalesTable};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Format a number for display, removing unnecessary decimal places
fn format_number(n: f64) -> String {
    let rounded = (n * 1e6).round() / 1e6;
    format!("{:.6}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Load the sales sheet, clean the price columns, and bind the schema.
///
/// Load failures print a diagnostic before propagating, so the process
/// aborts with a clear message and no output file is produced.
fn load_sales(input: &Path, sheet: &str) -> DashResult<SalesTable> {
    let reader = WorkbookReader::new(input);

    let raw: RawTable = match reader.load_sheet(sheet) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("{} {}", "❌ Failed to load base workbook:".red().bold(), e);
            return Err(e);
        }
    };
    debug!(rows = raw.rows.len(), "base sheet loaded");

    let cleaned = cleaner::coerce_numeric(&raw, &columns::NUMERIC);
    SalesTable::from_raw(&cleaned)
}

/// Execute the generate command: the full load → clean → aggregate →
/// render pipeline.
pub fn generate(input: PathBuf, output: PathBuf, sheet: String, verbose: bool) -> DashResult<()> {
    println!("{}", "📊 Subdash - Generating sales dashboard".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    let table = load_sales(&input, &sheet)?;
    if verbose {
        println!("   {} records loaded from '{}'", table.len(), sheet);
    }

    let metrics = aggregate(&table)?;
    if verbose {
        print_metric_summary(&metrics);
    }

    let reader = WorkbookReader::new(&input);
    let passthrough = reader.passthrough_sheets(&[CALC_SHEET, DASHBOARD_SHEET])?;
    if verbose {
        for (name, _) in &passthrough {
            println!("   Passing through sheet '{}'", name.cyan());
        }
        println!();
    }

    ReportWriter::new(metrics).save(&passthrough, &output)?;

    println!(
        "{}",
        format!(
            "✅ Dashboard de vendas gerado com sucesso em '{}'",
            output.display()
        )
        .bold()
        .green()
    );
    Ok(())
}

/// Execute the metrics command: aggregate and print, no workbook written.
pub fn metrics(input: PathBuf, sheet: String) -> DashResult<()> {
    println!("{}", "📐 Subdash - Sales metrics".bold().green());
    println!("   Input: {}\n", input.display());

    let table = load_sales(&input, &sheet)?;
    let metrics = aggregate(&table)?;

    print_metric_summary(&metrics);
    Ok(())
}

fn print_metric_summary(m: &DashboardMetrics) {
    println!("{}", "   Key metrics:".bold().cyan());
    println!(
        "      {} = {}",
        "Annual revenue".bright_blue(),
        format_number(m.annual_revenue).bold()
    );
    println!(
        "      {} = {}",
        "EA Play revenue".bright_blue(),
        format_number(m.ea_play_revenue).bold()
    );
    println!(
        "      {} = {}",
        "Minecraft revenue".bright_blue(),
        format_number(m.minecraft_revenue).bold()
    );
    println!(
        "      {} = {}",
        "Distinct subscribers".bright_blue(),
        m.total_subscribers.to_string().bold()
    );
    println!(
        "      {} = {}",
        "ARPU".bright_blue(),
        format_number(m.arpu).bold()
    );

    print_grouped("Annual revenue by auto renewal", &m.annual_by_auto_renewal);
    print_grouped("EA Play revenue by plan", &m.ea_play_by_plan);
    print_grouped("Minecraft revenue by plan", &m.minecraft_by_plan);
    print_grouped("Subscribers by plan", &m.subscribers_by_plan);
    println!();
}

fn print_grouped(label: &str, metric: &GroupedMetric) {
    println!("\n   {}", format!("{label}:").bold().cyan());
    for (key, value) in &metric.rows {
        println!("      {} = {}", key.bright_blue(), format_number(*value));
    }
}
