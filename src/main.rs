use clap::{Parser, Subcommand};
use std::path::PathBuf;
use subdash::cli;
use subdash::excel::BASES_SHEET;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "subdash")]
#[command(about = "Xbox Game Pass subscription sales dashboard generator")]
#[command(long_about = "Subdash - subscription sales dashboard generator

Reads the sales base workbook (.xlsx), cleans the price columns, computes
revenue and subscriber metrics, and writes a styled dashboard workbook:
a calculations sheet of titled metric blocks plus a dashboard sheet with
a banner, three metric cards, and two column charts.

COMMANDS:
  generate - Run the full pipeline and write the dashboard workbook
  metrics  - Print the aggregated metrics without writing a workbook

EXAMPLES:
  subdash generate                          # base.xlsx -> dashboard_vendas_final.xlsx
  subdash generate -i sales.xlsx -o out.xlsx
  subdash metrics -i sales.xlsx             # inspect the numbers only")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the dashboard workbook from the base workbook
    Generate {
        /// Path to the base workbook (.xlsx)
        #[arg(short, long, default_value = "base.xlsx")]
        input: PathBuf,

        /// Output workbook path (.xlsx), overwritten if present
        #[arg(short, long, default_value = "dashboard_vendas_final.xlsx")]
        output: PathBuf,

        /// Name of the sheet holding the sales records
        #[arg(long, default_value = BASES_SHEET)]
        sheet: String,

        /// Show pipeline progress
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the aggregated metrics without writing a workbook
    Metrics {
        /// Path to the base workbook (.xlsx)
        #[arg(short, long, default_value = "base.xlsx")]
        input: PathBuf,

        /// Name of the sheet holding the sales records
        #[arg(long, default_value = BASES_SHEET)]
        sheet: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            sheet,
            verbose,
        } => cli::generate(input, output, sheet, verbose)?,

        Commands::Metrics { input, sheet } => cli::metrics(input, sheet)?,
    }

    Ok(())
}
