//! CSV export of expense reports and raw transaction lists.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use sift_core::Transaction;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::report::{ExpenseReport, YearReport};

const EXPENSE_HEADER: [&str; 5] = ["group", "category", "vendor", "date", "amount"];
const TRANSACTION_HEADER: [&str; 10] = [
    "sequence_index",
    "line",
    "date",
    "posted",
    "description",
    "amount",
    "category",
    "group",
    "vendor",
    "debit",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Serialize)]
struct ExpenseRow<'a> {
    group: &'a str,
    category: &'a str,
    vendor: &'a str,
    date: String,
    amount: String,
}

#[derive(Serialize)]
struct TransactionRow<'a> {
    sequence_index: usize,
    line: usize,
    date: String,
    posted: String,
    description: &'a str,
    amount: String,
    category: &'a str,
    group: &'a str,
    vendor: &'a str,
    debit: String,
}

// Header rows are written explicitly so empty sections still get one.
fn headerless<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().has_headers(false).from_writer(out)
}

/// One row per transaction of the grouped (non-monthly) sections.
pub fn write_year_csv<W: Write>(year: &YearReport, out: W) -> Result<()> {
    let mut wtr = headerless(out);
    wtr.write_record(EXPENSE_HEADER)?;
    for group in &year.groups {
        for section in &group.categories {
            for t in &section.transactions {
                wtr.serialize(ExpenseRow {
                    group: &group.group,
                    category: &section.category,
                    vendor: t.display_name(),
                    date: t.date.format("%Y-%m-%d").to_string(),
                    amount: t.amount.to_string(),
                })?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Vendor x month pivot of the monthly groups.
pub fn write_monthly_csv<W: Write>(year: &YearReport, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let mut header = vec!["group", "category", "vendor"];
    header.extend(MONTHS);
    header.push("total");
    wtr.write_record(&header)?;

    for row in &year.monthly {
        let mut record = vec![row.group.clone(), row.category.clone(), row.vendor.clone()];
        record.extend(row.months.iter().map(|m| m.to_string()));
        record.push(row.total.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Dump a parsed transaction list, in order.
pub fn write_transactions_csv<W: Write>(txns: &[Transaction], out: W) -> Result<()> {
    let mut wtr = headerless(out);
    wtr.write_record(TRANSACTION_HEADER)?;
    for t in txns {
        wtr.serialize(TransactionRow {
            sequence_index: t.sequence_index,
            line: t.ordinal,
            date: t.date.format("%Y-%m-%d").to_string(),
            posted: t.posted.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            description: &t.description,
            amount: t.amount.to_string(),
            category: &t.category,
            group: t.group.as_deref().unwrap_or(""),
            vendor: t.vendor.as_deref().unwrap_or(""),
            debit: t
                .debit_ref
                .as_ref()
                .map(|d| format!("{} {}", d.kind.as_str(), d.id))
                .unwrap_or_default(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `<year>-expenses.csv` (and `<year>-monthly.csv` when the year has
/// monthly rows) into `dir`. Returns the written paths.
pub fn write_report(report: &ExpenseReport, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let mut written = Vec::new();
    for year in &report.years {
        let path = dir.join(format!("{}-expenses.csv", year.year));
        let file = fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
        write_year_csv(year, file).with_context(|| format!("write {}", path.display()))?;
        info!("wrote {}", path.display());
        written.push(path);

        if !year.monthly.is_empty() {
            let path = dir.join(format!("{}-monthly.csv", year.year));
            let file =
                fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
            write_monthly_csv(year, file).with_context(|| format!("write {}", path.display()))?;
            info!("wrote {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}
