//! Statement discovery and per-file parsing under an error policy.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use log::{debug, info};
use sift_core::{CategoryRuleSet, Transaction};
use sift_ingest::{StatementParse, layout_for_file, parse_statement_text, statement_date};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ErrorPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFile {
    pub path: PathBuf,
    pub name: String,
    pub start: NaiveDate,
}

impl StatementFile {
    /// Describe `path` as a statement, if its stem ends in a valid date.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no usable file name", path.display()))?
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name.as_str());
        let start = statement_date(stem)?;
        Ok(Self {
            path: path.to_path_buf(),
            name,
            start,
        })
    }

    pub fn layout_name(&self) -> String {
        layout_for_file(&self.name).name
    }

    pub fn parse(&self, rules: &CategoryRuleSet) -> Result<StatementParse> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        parse_statement_text(&text, &layout_for_file(&self.name), self.start, rules)
            .with_context(|| format!("parse {}", self.name))
    }
}

/// Statement text files in `dir`, sorted by file name. Files whose names do
/// not carry a statement date are reported and skipped.
pub fn discover(dir: &Path) -> Result<Vec<StatementFile>> {
    let entries = fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        match StatementFile::from_path(&path) {
            Ok(file) => files.push(file),
            Err(e) => eprintln!("Skipping {}: {e:#}", path.display()),
        }
    }
    debug!("found {} statements in {}", files.len(), dir.display());
    Ok(files)
}

/// Parse every statement in order and concatenate their transactions.
pub fn parse_all(
    files: &[StatementFile],
    rules: &CategoryRuleSet,
    policy: ErrorPolicy,
) -> Result<Vec<Transaction>> {
    let mut txns = Vec::new();

    for file in files {
        let parse = match file.parse(rules) {
            Ok(parse) => parse,
            Err(e) => match policy {
                ErrorPolicy::Halt => return Err(e),
                ErrorPolicy::Warn => {
                    eprintln!("warning: {e:#}");
                    continue;
                }
                ErrorPolicy::Ignore => continue,
            },
        };

        if let Some(first) = parse.errors.first() {
            match policy {
                ErrorPolicy::Halt => bail!("{}: {}", file.name, first),
                ErrorPolicy::Warn => {
                    for err in &parse.errors {
                        eprintln!("warning: {}: {}", file.name, err);
                    }
                }
                ErrorPolicy::Ignore => {}
            }
        }

        info!(
            "{}: {} transactions ({} reversed)",
            file.name,
            parse.transactions.len(),
            parse.reversals.len()
        );
        txns.extend(parse.transactions);
    }

    Ok(txns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_sorts_and_skips_undated() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "VISA Avion Unlimited 2024-02-03.txt",
            "My Main Money Account 2024-01-15.txt",
            "notes.txt",
            "scan 2024-01-15.pdf",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let files = discover(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["My Main Money Account 2024-01-15.txt", "VISA Avion Unlimited 2024-02-03.txt"]
        );
        assert_eq!(files[0].start, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(files[0].layout_name(), "chequing");
    }

    #[test]
    fn test_policy_on_block_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generic 2024-01-31.txt");
        // undated first entry has no date to inherit
        fs::write(&path, "COFFEE $4.00\n").unwrap();
        let files = vec![StatementFile::from_path(&path).unwrap()];
        let rules = CategoryRuleSet::default();

        assert!(parse_all(&files, &rules, ErrorPolicy::Halt).is_err());
        let kept = parse_all(&files, &rules, ErrorPolicy::Ignore).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn test_policy_on_wrong_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VISA Avion Unlimited 2024-02-03.txt");
        fs::write(&path, "no header here\n").unwrap();
        let files = vec![StatementFile::from_path(&path).unwrap()];
        let rules = CategoryRuleSet::default();

        assert!(parse_all(&files, &rules, ErrorPolicy::Halt).is_err());
        assert!(parse_all(&files, &rules, ErrorPolicy::Warn).unwrap().is_empty());
    }
}
