use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sift_finance::ReportOptions;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_sift_home;

/// What to do when a statement block cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first unresolved block
    Halt,
    /// Report each unresolved block on stderr and continue
    #[default]
    Warn,
    /// Skip unresolved blocks silently
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub statement_dir: PathBuf,
    pub output_dir: PathBuf,
    pub categories_path: PathBuf,
    pub hidden_groups: Vec<String>,
    pub monthly_groups: Vec<String>,
    pub on_error: ErrorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        let report = ReportOptions::default();
        Self {
            statement_dir: PathBuf::from("statements"),
            output_dir: PathBuf::from("output"),
            categories_path: PathBuf::from("categories.json"),
            hidden_groups: report.hidden_groups,
            monthly_groups: report.monthly_groups,
            on_error: ErrorPolicy::default(),
        }
    }
}

impl Config {
    /// Apply `SIFT_*` overrides from `lookup` (normally the process env).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("SIFT_STATEMENT_DIR") {
            self.statement_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("SIFT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("SIFT_CATEGORIES") {
            self.categories_path = PathBuf::from(path);
        }
        self
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            hidden_groups: self.hidden_groups.clone(),
            monthly_groups: self.monthly_groups.clone(),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(ensure_sift_home()?.join("config.toml"))
}

fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = resolve_path(explicit)?;
    let cfg = if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?
    } else {
        Config::default()
    };
    Ok(cfg.with_overrides(|k| std::env::var(k).ok()))
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = resolve_path(explicit)?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
