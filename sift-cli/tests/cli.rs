//! End-to-end tests for the `sift` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CHEQUING: &str = "My Main Money Account 2024-01-15.txt";
const VISA: &str = "VISA Avion Unlimited 2024-02-03.txt";

const CATEGORIES: &str = r#"{
    "Food": {
        "Groceries": { "SOBEYS": "Sobeys" },
        "Coffee": { "TIM HORTONS": "Tim Hortons" }
    },
    "Business": {
        "Software": { "GITHUB": "GitHub" },
        "Bank Fees": { "NSF item fee": "NSF fees", "OVERLIMIT FEE": null }
    },
    "Housing and Utilities": {
        "Utilities": { "HYDRO ONE": "Hydro One" }
    },
    "Ignore": {
        "Payments": { "PAYMENT - THANK YOU": null }
    }
}"#;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("sift-ingest/tests/data")
        .join(name)
}

/// Temp workspace: statements/, categories.json and config.toml
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let statements = dir.path().join("statements");
        fs::create_dir_all(&statements).unwrap();
        for name in [CHEQUING, VISA] {
            fs::copy(fixture(name), statements.join(name)).unwrap();
        }
        fs::write(statements.join("notes.txt"), "not a statement\n").unwrap();
        fs::write(dir.path().join("categories.json"), CATEGORIES).unwrap();

        let config = format!(
            "statement_dir = {:?}\noutput_dir = {:?}\ncategories_path = {:?}\n",
            statements.display().to_string(),
            dir.path().join("out").display().to_string(),
            dir.path().join("categories.json").display().to_string(),
        );
        fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn sift(&self) -> Command {
        let mut cmd = Command::cargo_bin("sift").unwrap();
        cmd.env("HOME", self.path())
            .env_remove("SIFT_STATEMENT_DIR")
            .env_remove("SIFT_OUTPUT_DIR")
            .env_remove("SIFT_CATEGORIES")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.path().join("config.toml"));
        cmd
    }
}

#[test]
fn test_process_dry_run_prints_report_only() {
    let ws = Workspace::new();
    ws.sift()
        .args(["--dry-run", "process"])
        .assert()
        .success()
        .stdout(predicate::str::contains("== 2023 =="))
        .stdout(predicate::str::contains("== 2024 =="))
        .stdout(predicate::str::contains("Hydro One"))
        .stdout(predicate::str::contains("PAYMENT").not())
        .stderr(predicate::str::contains("line 14"));

    assert!(!ws.path().join("out").exists());
}

#[test]
fn test_process_writes_csv_files() {
    let ws = Workspace::new();
    ws.sift().arg("process").assert().success();

    let out = ws.path().join("out");
    for name in ["2023-expenses.csv", "2024-expenses.csv", "2024-monthly.csv"] {
        assert!(out.join(name).exists(), "missing {name}");
    }
    let expenses = fs::read_to_string(out.join("2024-expenses.csv")).unwrap();
    assert_eq!(
        expenses,
        "group,category,vendor,date,amount\n\
         Business,Bank Fees,OVERLIMIT FEE,2024-01-28,29.00\n\
         Business,Software,GitHub,2024-01-05,5.00\n\
         Food,Groceries,Sobeys,2024-01-30,62.18\n"
    );
    assert!(!expenses.contains("AMAZON"));
}

#[test]
fn test_halt_policy_stops_on_unresolved_block() {
    let ws = Workspace::new();
    ws.sift()
        .args(["--on-error", "halt", "process"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(CHEQUING))
        .stderr(predicate::str::contains("line 14"));
    assert!(!ws.path().join("out").exists());
}

#[test]
fn test_csv_format_dumps_transactions() {
    let ws = Workspace::new();
    ws.sift()
        .args(["--dry-run", "--on-error", "ignore", "process", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("sequence_index,line,date,posted,"))
        .stdout(predicate::str::contains("NSF item fee (x2)"))
        .stderr(predicate::str::contains("line 14").not());
}

#[test]
fn test_parse_single_statement() {
    let ws = Workspace::new();
    ws.sift()
        .arg("parse")
        .arg(ws.path().join("statements").join(CHEQUING))
        .assert()
        .success()
        .stdout(predicate::str::contains("chequing layout"))
        .stdout(predicate::str::contains("NSF item fee (x2)"))
        .stdout(predicate::str::contains("Reversed by NSF"))
        .stdout(predicate::str::contains("GOODLIFE"));
}

#[test]
fn test_parse_needs_a_date() {
    let ws = Workspace::new();
    let notes = ws.path().join("statements").join("notes.txt");
    ws.sift()
        .arg("parse")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--start"));

    ws.sift()
        .arg("parse")
        .arg(&notes)
        .args(["--start", "2024-01-31"])
        .assert()
        .success();
}

#[test]
fn test_list_files_skips_undated_names() {
    let ws = Workspace::new();
    ws.sift()
        .arg("list-files")
        .assert()
        .success()
        .stdout(predicate::str::contains("chequing"))
        .stdout(predicate::str::contains("visa"))
        .stdout(predicate::str::contains("2 statements"))
        .stderr(predicate::str::contains("Skipping"));
}

#[test]
fn test_list_categories_in_rule_order() {
    let ws = Workspace::new();
    let assert = ws.sift().arg("list-categories").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let sobeys = stdout.find("SOBEYS").unwrap();
    let hydro = stdout.find("HYDRO ONE").unwrap();
    assert!(sobeys < hydro);
    assert!(stdout.contains("7 rules"));
}

#[test]
fn test_config_init_writes_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("sift").unwrap();
    cmd.env("HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let written = fs::read_to_string(dir.path().join(".sift").join("config.toml")).unwrap();
    assert!(written.contains("hidden_groups"));
    assert!(written.contains("on_error = \"warn\""));

    let mut again = Command::cargo_bin("sift").unwrap();
    again
        .env("HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
