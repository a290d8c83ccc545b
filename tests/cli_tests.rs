//! CLI behavior tests: exit codes, diagnostics, and the success message.

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use subdash::excel::BASES_SHEET;
use tempfile::TempDir;

/// Minimal valid base workbook for driving the binary.
fn write_base_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(BASES_SHEET).unwrap();

    let headers = [
        "Subscriber ID",
        "Plan",
        "Subscription Type",
        "Auto Renewal",
        "Subscription Price",
        "EA Play Season Pass Price",
        "Minecraft Season Pass Price",
        "Coupon Value",
        "Total Value",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    sheet.write_number(1, 0, 1.0).unwrap();
    sheet.write_string(1, 1, "Ultimate").unwrap();
    sheet.write_string(1, 2, "Annual").unwrap();
    sheet.write_string(1, 3, "Yes").unwrap();
    sheet.write_number(1, 4, 10.0).unwrap();
    sheet.write_string(1, 5, "-").unwrap();
    sheet.write_number(1, 6, 2.0).unwrap();
    sheet.write_number(1, 7, 0.0).unwrap();
    sheet.write_number(1, 8, 12.0).unwrap();

    workbook.save(path).unwrap();
}

fn subdash() -> Command {
    Command::cargo_bin("subdash").unwrap()
}

#[test]
fn generate_fails_on_missing_input() {
    let dir = TempDir::new().unwrap();

    subdash()
        .current_dir(dir.path())
        .args(["generate", "-i", "missing.xlsx", "-o", "out.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load base workbook"))
        .stderr(predicate::str::contains("not found"));

    assert!(!dir.path().join("out.xlsx").exists());
}

#[test]
fn generate_fails_on_unknown_sheet() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("base.xlsx");
    write_base_workbook(&base);

    subdash()
        .current_dir(dir.path())
        .args(["generate", "--sheet", "Vendas"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'Vendas' not found"));
}

#[test]
fn generate_writes_the_dashboard_workbook() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("base.xlsx");
    write_base_workbook(&base);

    subdash()
        .current_dir(dir.path())
        .args(["generate", "-o", "dashboard.xlsx", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gerado com sucesso"));

    assert!(dir.path().join("dashboard.xlsx").exists());
}

#[test]
fn generate_uses_default_output_path() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("base.xlsx");
    write_base_workbook(&base);

    subdash().current_dir(dir.path()).arg("generate").assert().success();

    assert!(dir.path().join("dashboard_vendas_final.xlsx").exists());
}

#[test]
fn metrics_prints_the_summary() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("base.xlsx");
    write_base_workbook(&base);

    subdash()
        .current_dir(dir.path())
        .arg("metrics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Annual revenue"))
        .stdout(predicate::str::contains("ARPU"))
        .stdout(predicate::str::contains("12"));
}

#[test]
fn help_lists_the_commands() {
    subdash()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("metrics"));
}
