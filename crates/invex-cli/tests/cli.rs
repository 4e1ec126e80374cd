use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn store(&self) -> PathBuf {
        self.dir.path().join("data").join("invoices.json")
    }

    fn seed(&self, records: Value) {
        fs::create_dir_all(self.store().parent().unwrap()).unwrap();
        fs::write(self.store(), serde_json::to_string_pretty(&records).unwrap()).unwrap();
    }

    fn stored(&self) -> Vec<Value> {
        let content = fs::read_to_string(self.store()).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("invex").unwrap();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .arg("--store")
            .arg(self.store());
        cmd
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn sample_records() -> Value {
    json!([
        {
            "invoiceNumber": "2024-001",
            "invoiceDate": "15.01.2024",
            "providerName": "Elektro d.o.o.",
            "providerAddress": "Glavna 1, Ljubljana",
            "providerPhone": "01 234 5678",
            "providerEmail": "info@elektro.si",
            "invoiceValue": "120,50 EUR",
            "pdfDataUri": "data:application/pdf;base64,JVBERi0xLjQK"
        },
        {
            "invoiceNumber": "77",
            "invoiceDate": "03.03.2024",
            "providerName": "Voda",
            "providerAddress": "",
            "providerPhone": "",
            "providerEmail": "",
            "invoiceValue": "15,00 EUR"
        },
        {
            "invoiceNumber": "2024-002",
            "invoiceDate": "15.02.2024",
            "providerName": "Elektro d.o.o.",
            "providerAddress": "Glavna 1, Ljubljana",
            "providerPhone": "01 234 5678",
            "providerEmail": "info@elektro.si",
            "invoiceValue": "98,10 EUR"
        }
    ])
}

fn numbers(records: &[Value]) -> Vec<&str> {
    records
        .iter()
        .map(|r| r["invoiceNumber"].as_str().unwrap())
        .collect()
}

#[test]
fn list_empty_store() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No data has been extracted yet"));
}

#[test]
fn list_json_omits_pdf_by_default() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    let output = ws
        .cmd()
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(numbers(&records), vec!["2024-001", "77", "2024-002"]);
    assert!(records[0].get("pdfDataUri").is_none());
}

#[test]
fn list_json_sorted_by_date() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    let output = ws
        .cmd()
        .args(["list", "--format", "json", "--sort-date", "--include-pdf"])
        .output()
        .unwrap();

    let records: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(numbers(&records), vec!["77", "2024-002", "2024-001"]);
    assert!(records[2]["pdfDataUri"].as_str().is_some());
}

#[test]
fn list_csv_uses_placeholder() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    ws.cmd()
        .args(["list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Provider Name,Invoice Number"))
        .stdout(predicate::str::contains("Voda,77,03.03.2024,N/A,N/A,N/A"));
}

#[test]
fn groups_by_provider() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    ws.cmd()
        .arg("groups")
        .assert()
        .success()
        .stdout(predicate::str::contains("Elektro d.o.o. (2 invoice(s))"))
        .stdout(predicate::str::contains("Voda (1 invoice(s))"));
}

#[test]
fn show_single_invoice() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    ws.cmd()
        .args(["show", "77", "03.03.2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("15,00 EUR"));

    ws.cmd()
        .args(["show", "77", "04.03.2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No invoice 77 dated 04.03.2024"));
}

#[test]
fn delete_is_idempotent() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    ws.cmd()
        .args(["delete", "77", "03.03.2024", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted invoice 77"))
        .stdout(predicate::str::contains("2 invoice(s) remaining"));

    ws.cmd()
        .args(["delete", "77", "03.03.2024", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No invoice 77"));

    assert_eq!(numbers(&ws.stored()), vec!["2024-001", "2024-002"]);
}

#[test]
fn delete_provider_keeps_others() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    ws.cmd()
        .args(["delete-provider", "Elektro d.o.o.", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 invoice(s)"));

    assert_eq!(numbers(&ws.stored()), vec!["77"]);
}

#[test]
fn clear_empties_store() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    ws.cmd()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 3 invoice(s)"));

    assert!(ws.stored().is_empty());
}

#[test]
fn export_csv_to_file() {
    let ws = Workspace::new();
    ws.seed(sample_records());
    let out = ws.path("out.csv");

    ws.cmd()
        .args(["export", "--format", "csv", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 invoice(s)"));

    let content = fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().count(), 4);
}

#[test]
fn export_single_invoice_xlsx_default_name() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    ws.cmd()
        .args(["export", "--invoice", "2024-001", "--date", "15.01.2024"])
        .assert()
        .success();

    assert!(ws.path("invoice-2024-001.xlsx").exists());
}

#[test]
fn export_empty_store_fails() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["export", "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to export"));
}

#[test]
fn view_writes_stored_pdf() {
    let ws = Workspace::new();
    ws.seed(sample_records());
    let out = ws.path("source.pdf");

    ws.cmd()
        .args(["view", "2024-001", "15.01.2024", "--output"])
        .arg(&out)
        .assert()
        .success();

    assert!(fs::read(&out).unwrap().starts_with(b"%PDF-1.4"));
}

#[test]
fn view_without_pdf_fails() {
    let ws = Workspace::new();
    ws.seed(sample_records());

    ws.cmd()
        .args(["view", "77", "03.03.2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no stored source PDF"));
}

#[test]
fn extract_rejects_non_pdf() {
    let ws = Workspace::new();
    let file = ws.path("notes.pdf");
    fs::write(&file, "plain text").unwrap();

    ws.cmd()
        .arg("extract")
        .arg(&file)
        .env_remove("GEMINI_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid PDF files"));

    assert!(!ws.store().exists());
}

#[test]
fn extract_missing_file() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["extract", "missing.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_path_mentions_init() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}
