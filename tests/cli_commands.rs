// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write file");
}

const CONFIG: &str = r#"
sector_table = "data/sectors.json"
exchange_priority = ["NSE", "BSE"]

[catalog]
curated = "data/stocks.csv"
nse = "data/nse_equity.csv"
brand_mappings = "data/brands.json"

[popularity.scores]
HDFCBANK = 0.96
ICICIBANK = 0.94
BANKBARODA = 0.99
"#;

fn setup_workspace() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();

    write_file(&root.join(".scriprc.toml"), CONFIG);
    write_file(
        &root.join("data/stocks.csv"),
        "Symbol,Name,Exchange,Type,Brand\n\
         RELIANCE,Reliance Industries Limited,NSE,Stock,Jio\n\
         RELIANCE,Reliance Industries Limited,BSE,Stock,Jio\n\
         TCS,Tata Consultancy Services,NSE,,\n\
         NIFTYBEES,Nippon India Nifty ETF,NSE,ETF,\n",
    );
    write_file(
        &root.join("data/nse_equity.csv"),
        "SYMBOL,NAME OF COMPANY,SERIES\n\
         HDFCBANK,HDFC Bank Limited,EQ\n\
         ICICIBANK,ICICI Bank Limited,EQ\n\
         BANKBARODA,Bank of Baroda,EQ\n",
    );
    write_file(
        &root.join("data/brands.json"),
        r#"{ "TCS": "TCS iON" }"#,
    );
    write_file(
        &root.join("data/sectors.json"),
        r#"{
            "sectors": {
                "banking": {
                    "keywords": ["bank"],
                    "symbols": ["HDFCBANK", "ICICIBANK"],
                    "industry": "Banks"
                }
            }
        }"#,
    );
    dir
}

fn scrip(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("scrip"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env_remove("SCRIP_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command, args: &[&str]) -> Value {
    let assert = cmd.args(args).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    serde_json::from_str(&stdout).expect("json")
}

fn build_index(dir: &Path) -> Value {
    json_stdout(&mut scrip(dir), &["--format", "json", "index"])
}

#[test]
fn index_reports_loaded_instruments() {
    let dir = setup_workspace();
    let summary = build_index(dir.path());
    assert_eq!(summary["documents"], 7);
    assert_eq!(summary["rebuilt"], false);
    assert!(dir.path().join(".scrip/index/meta.json").exists());
}

#[test]
fn index_is_skipped_unless_forced() {
    let dir = setup_workspace();
    build_index(dir.path());

    let skipped = json_stdout(&mut scrip(dir.path()), &["--format", "json", "index"]);
    assert_eq!(skipped["skipped"], true);

    let rebuilt = json_stdout(&mut scrip(dir.path()), &["--format", "json", "index", "--force"]);
    assert_eq!(rebuilt["rebuilt"], true);
    assert_eq!(rebuilt["documents"], 7);
}

#[test]
fn thematic_search_returns_sector_members() {
    let dir = setup_workspace();
    build_index(dir.path());

    let results = json_stdout(
        &mut scrip(dir.path()),
        &["--format", "json", "search", "top banking stocks"],
    );
    let symbols: Vec<&str> = results
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|r| r["symbol"].as_str())
        .collect();
    assert_eq!(symbols, vec!["HDFCBANK", "ICICIBANK"]);
    assert_eq!(results[0]["sector"], "banking");
    assert_eq!(results[0]["industry"], "Banks");
}

#[test]
fn regular_search_ranks_exact_symbol_first_and_respects_limit() {
    let dir = setup_workspace();
    build_index(dir.path());

    let results = json_stdout(
        &mut scrip(dir.path()),
        &["--format", "json", "--compact", "s", "tcs", "-m", "1"],
    );
    let results = results.as_array().expect("array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["symbol"], "TCS");
    assert_eq!(results[0]["type"], "Stock");
    assert_eq!(results[0]["brand"], "TCS iON");
}

#[test]
fn get_honours_exchange_and_falls_back() {
    let dir = setup_workspace();
    build_index(dir.path());

    let bse = json_stdout(
        &mut scrip(dir.path()),
        &["--format", "json", "get", "reliance", "--exchange", "BSE"],
    );
    assert_eq!(bse["exchange"], "BSE");
    assert_eq!(bse["brand"], "Jio");

    let fallback = json_stdout(
        &mut scrip(dir.path()),
        &["--format", "json", "get", "RELIANCE", "--exchange", "XSE"],
    );
    assert_eq!(fallback["exchange"], "NSE");

    let etf = json_stdout(&mut scrip(dir.path()), &["--format", "json", "get", "niftybees"]);
    assert_eq!(etf["type"], "ETF");
}

#[test]
fn get_unknown_symbol_fails() {
    let dir = setup_workspace();
    build_index(dir.path());

    scrip(dir.path())
        .args(["get", "NOSUCH"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOSUCH"));
}

#[test]
fn search_without_index_suggests_building_one() {
    let dir = setup_workspace();

    scrip(dir.path())
        .args(["search", "reliance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scrip index"));
}

#[test]
fn index_without_sources_fails() {
    let dir = TempDir::new().expect("tempdir");

    scrip(dir.path())
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No catalog sources configured"));
}

#[test]
fn sectors_lists_members() {
    let dir = setup_workspace();

    let sectors = json_stdout(&mut scrip(dir.path()), &["--format", "json", "sectors"]);
    assert_eq!(sectors["banking"][0], "HDFCBANK");
    assert_eq!(sectors["banking"][1], "ICICIBANK");
}

#[test]
fn text_search_prints_results() {
    let dir = setup_workspace();
    build_index(dir.path());

    scrip(dir.path())
        .args(["search", "reliance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RELIANCE"))
        .stdout(predicate::str::contains("Found 2 instruments"));
}

#[test]
fn text_search_without_matches_prints_suggestion_once() {
    let dir = setup_workspace();
    build_index(dir.path());

    scrip(dir.path())
        .args(["search", "zzzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No instruments found for 'zzzz'"))
        .stdout(predicate::str::contains("Results for").not())
        .stdout(predicate::str::contains("Found 0").not());
}
