use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use sift_core::CategoryRuleSet;
use sift_finance::{ExpenseReport, drop_corrected_debits, load_categories, write_report, write_transactions_csv};
use std::path::{Path, PathBuf};

mod config;
mod render;
mod state;
mod statements;

use config::{Config, ErrorPolicy};
use statements::StatementFile;

#[derive(Parser, Debug)]
#[command(name = "sift", version, about = "Parse bank statements into categorized expense reports")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results without writing any files
    #[arg(long, global = true)]
    dry_run: bool,

    /// Config file (default: ~/.sift/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How to treat blocks that cannot be resolved (default: from config)
    #[arg(long, global = true, value_enum)]
    on_error: Option<ErrorPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the loaded category rules in match order
    ListCategories,

    /// List statement files found in the statement directory
    ListFiles,

    /// Parse every statement, print the expense report and export CSV files
    Process {
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },

    /// Parse a single statement file and show what was recognized
    Parse {
        file: PathBuf,

        /// Statement date (default: trailing YYYY-MM-DD of the file name)
        #[arg(long)]
        start: Option<NaiveDate>,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let cfg_path = cli.config.as_deref();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(cfg_path)?,
        },

        Command::ListCategories => {
            let cfg = config::load_config(cfg_path)?;
            let rules = load_categories(&cfg.categories_path)?;
            render::print_rules(&rules);
        }

        Command::ListFiles => {
            let cfg = config::load_config(cfg_path)?;
            let files = statements::discover(&cfg.statement_dir)?;
            for f in &files {
                println!("{}  {:<9} {}", f.start, f.layout_name(), f.name);
            }
            println!("\n{} statements in {}", files.len(), cfg.statement_dir.display());
        }

        Command::Process { format } => {
            let cfg = config::load_config(cfg_path)?;
            let policy = cli.on_error.unwrap_or(cfg.on_error);
            process(&cfg, policy, format, cli.dry_run)?;
        }

        Command::Parse { file, start } => {
            let cfg = config::load_config(cfg_path)?;
            let policy = cli.on_error.unwrap_or(cfg.on_error);
            parse_one(&cfg, &file, start, policy)?;
        }
    }

    Ok(())
}

fn process(cfg: &Config, policy: ErrorPolicy, format: Format, dry_run: bool) -> Result<()> {
    let rules = load_categories(&cfg.categories_path)?;
    let files = statements::discover(&cfg.statement_dir)?;
    if files.is_empty() {
        bail!(
            "No statements found in {} (expected files named like \"VISA Avion Unlimited 2024-02-03.txt\")",
            cfg.statement_dir.display()
        );
    }

    let txns = statements::parse_all(&files, &rules, policy)?;
    let txns = drop_corrected_debits(txns);
    let report = ExpenseReport::build(&txns, &cfg.report_options());

    match format {
        Format::Table => {
            println!("Parsed {} transactions from {} statements\n", txns.len(), files.len());
            render::print_report(&report);
        }
        Format::Csv => write_transactions_csv(&txns, std::io::stdout().lock())?,
    }

    if dry_run {
        debug!("dry run: not writing {}", cfg.output_dir.display());
        return Ok(());
    }

    for path in write_report(&report, &cfg.output_dir)? {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn rules_or_empty(path: &Path) -> Result<CategoryRuleSet> {
    if !path.exists() {
        eprintln!("No categories at {}; everything is Uncategorized", path.display());
        return Ok(CategoryRuleSet::default());
    }
    load_categories(path)
}

fn parse_one(cfg: &Config, file: &Path, start: Option<NaiveDate>, policy: ErrorPolicy) -> Result<()> {
    let statement = match start {
        Some(start) => StatementFile {
            path: file.to_path_buf(),
            name: file
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("{} has no usable file name", file.display()))?
                .to_string(),
            start,
        },
        None => StatementFile::from_path(file).context("pass --start YYYY-MM-DD")?,
    };

    let rules = rules_or_empty(&cfg.categories_path)?;
    let parse = statement.parse(&rules)?;

    println!(
        "{} ({} layout, statement date {})\n",
        statement.name,
        statement.layout_name(),
        statement.start
    );
    render::print_transactions(&parse.transactions);
    render::print_reversals(&parse.reversals);
    if policy != ErrorPolicy::Ignore {
        render::print_errors(&parse.errors);
    }

    if policy == ErrorPolicy::Halt && !parse.errors.is_empty() {
        bail!("{} unresolved blocks in {}", parse.errors.len(), statement.name);
    }
    Ok(())
}
