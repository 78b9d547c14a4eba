//! CLI end-to-end tests driving the compiled binary against ledger files

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::TempDir;

fn ledger_json() -> &'static str {
    r#"[
        {"id":"b1","date":"2023-01-05","type":"buy","asset":"BTC","amount":2,"price":100,"fee":1},
        {"id":"s1","date":"2023-03-10","type":"sell","asset":"BTC","amount":1,"price":150},
        {"id":"s2","date":"2023-09-01","type":"sell","asset":"BTC","amount":1,"price":80},
        {"id":"b2","date":"2023-09-10","type":"buy","asset":"BTC","amount":1,"price":85}
    ]"#
}

fn write_ledger(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path.to_string_lossy().into_owned()
}

fn cmd() -> Command {
    Command::cargo_bin("gainledger").unwrap()
}

#[test]
fn report_prints_summary() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(&dir, "ledger.json", ledger_json());

    cmd()
        .args(["--no-color", "report", &path, "2023"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tax summary 2023"))
        .stdout(predicate::str::contains("Net gain"));
}

#[test]
fn report_json_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(&dir, "ledger.json", ledger_json());

    let output = cmd()
        .args(["--json", "report", &path, "2023"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["year"], 2023);
    assert_eq!(summary["method"], "FIFO");
    assert_eq!(summary["transaction_count"], 4);
    assert_eq!(summary["capital_gains"].as_array().unwrap().len(), 2);
}

#[test]
fn report_export_writes_csv_file() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(&dir, "ledger.json", ledger_json());

    cmd()
        .current_dir(dir.path())
        .args(["--no-color", "report", &path, "2023", "--export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tax_report_2023.csv"));

    let csv = std::fs::read_to_string(dir.path().join("tax_report_2023.csv")).unwrap();
    assert!(csv.starts_with("Date,Asset,Amount,Proceeds,Cost Basis,Gain/Loss,Term"));
    assert!(csv.contains("SUMMARY,2023"));
}

#[test]
fn gains_supports_lifo() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(&dir, "ledger.json", ledger_json());

    cmd()
        .args(["--json", "gains", &path, "--method", "LIFO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"disposal_id\": \"s1\""));
}

#[test]
fn unknown_method_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(&dir, "ledger.json", ledger_json());

    cmd()
        .args(["report", &path, "2023", "--method", "HIFO"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown cost basis method"));
}

#[test]
fn wash_sales_flags_the_september_repurchase() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(&dir, "ledger.json", ledger_json());

    cmd()
        .args(["--no-color", "wash-sales", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("s2"))
        .stdout(predicate::str::contains("b2"));
}

#[test]
fn check_enumerates_rejected_records() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(
        &dir,
        "ledger.csv",
        "id,date,type,asset,amount,price,value,fee,tag\n\
         ok1,2023-01-01,buy,BTC,1,100,,0,\n\
         bad1,2023-01-02,mint,BTC,1,100,,0,\n",
    );

    cmd()
        .args(["--json", "check", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"accepted\": 1"))
        .stdout(predicate::str::contains("unknown transaction type 'mint'"));
}
