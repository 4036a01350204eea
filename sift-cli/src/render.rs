//! Plain-text tables for the terminal.

use sift_core::{CategoryRuleSet, Transaction};
use sift_finance::{ExpenseReport, YearReport};
use sift_ingest::{ParseError, Reversal};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

pub fn print_rules(rules: &CategoryRuleSet) {
    println!("{:<24} {:<24} {:<28} {}", "GROUP", "CATEGORY", "PATTERN", "VENDOR");
    for r in rules.rules() {
        println!(
            "{:<24} {:<24} {:<28} {}",
            clip(&r.group, 24),
            clip(&r.category, 24),
            clip(&r.pattern, 28),
            r.vendor
        );
    }
    println!("\n{} rules", rules.len());
}

pub fn print_transactions(txns: &[Transaction]) {
    println!(
        "{:>4} {:>5}  {:<10}  {:<40} {:>10}  {}",
        "#", "LINE", "DATE", "DESCRIPTION", "AMOUNT", "CATEGORY"
    );
    for t in txns {
        println!(
            "{:>4} {:>5}  {}  {:<40} {:>10}  {}",
            t.sequence_index,
            t.ordinal,
            t.date,
            clip(&t.description, 40),
            t.amount.to_string(),
            t.category
        );
    }
}

pub fn print_reversals(reversals: &[Reversal]) {
    if reversals.is_empty() {
        return;
    }
    println!("\nReversed by NSF:");
    for r in reversals {
        println!(
            "  line {:>4}: {} \"{}\" {}",
            r.ordinal, r.removed.date, r.removed.description, r.removed.amount
        );
    }
}

pub fn print_errors(errors: &[ParseError]) {
    if errors.is_empty() {
        return;
    }
    println!("\nUnresolved blocks:");
    for e in errors {
        println!("  {e}");
    }
}

fn print_year(year: &YearReport) {
    println!("== {} ==", year.year);
    for group in &year.groups {
        println!("\n{} ({})", group.group, group.total());
        for section in &group.categories {
            println!("  {:<36} {:>10}", clip(&section.category, 36), section.total.to_string());
            for t in &section.transactions {
                println!(
                    "    {}  {:<28} {:>10}",
                    t.date,
                    clip(t.display_name(), 28),
                    t.amount.to_string()
                );
            }
        }
    }

    if !year.monthly.is_empty() {
        println!("\nMonthly");
        print!("  {:<24}", "VENDOR");
        for m in MONTHS {
            print!(" {m:>8}");
        }
        println!(" {:>10}", "TOTAL");
        for row in &year.monthly {
            print!("  {:<24}", clip(&row.vendor, 24));
            for v in &row.months {
                print!(" {:>8}", v.to_string());
            }
            println!(" {:>10}", row.total.to_string());
        }
    }

    println!("\nTotal {}: {}\n", year.year, year.total());
}

pub fn print_report(report: &ExpenseReport) {
    if report.is_empty() {
        println!("No transactions to report.");
        return;
    }
    for year in &report.years {
        print_year(year);
    }
}
