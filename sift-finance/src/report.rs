//! Expense report: categorized transactions grouped by year, report group
//! and category, with monthly vendor pivots for recurring groups.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sift_core::{Transaction, UNCATEGORIZED};
use std::collections::BTreeMap;

/// Which report groups are dropped or pivoted by month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    pub hidden_groups: Vec<String>,
    pub monthly_groups: Vec<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            hidden_groups: vec!["Ignore".to_string()],
            monthly_groups: vec!["Housing and Utilities".to_string()],
        }
    }
}

impl ReportOptions {
    pub fn is_hidden(&self, group: &str) -> bool {
        self.hidden_groups.iter().any(|g| g == group)
    }

    pub fn is_monthly(&self, group: &str) -> bool {
        self.monthly_groups.iter().any(|g| g == group)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySection {
    pub category: String,
    pub transactions: Vec<Transaction>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSection {
    pub group: String,
    pub categories: Vec<CategorySection>,
}

impl GroupSection {
    pub fn total(&self) -> Decimal {
        self.categories.iter().map(|c| c.total).sum()
    }
}

/// Vendor totals per calendar month (index 0 = January)
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow {
    pub group: String,
    pub category: String,
    pub vendor: String,
    pub months: [Decimal; 12],
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearReport {
    pub year: i32,
    pub groups: Vec<GroupSection>,
    pub monthly: Vec<MonthlyRow>,
}

impl YearReport {
    pub fn total(&self) -> Decimal {
        let grouped: Decimal = self.groups.iter().map(GroupSection::total).sum();
        let monthly: Decimal = self.monthly.iter().map(|r| r.total).sum();
        grouped + monthly
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseReport {
    pub years: Vec<YearReport>,
}

type CategoryMap = BTreeMap<String, Vec<Transaction>>;
type MonthlyMap = BTreeMap<(String, String, String), [Decimal; 12]>;

#[derive(Default)]
struct YearBuckets {
    groups: BTreeMap<String, CategoryMap>,
    monthly: MonthlyMap,
}

impl ExpenseReport {
    pub fn build(txns: &[Transaction], opts: &ReportOptions) -> Self {
        let mut years: BTreeMap<i32, YearBuckets> = BTreeMap::new();

        for txn in txns {
            let group = txn.group.as_deref().unwrap_or(UNCATEGORIZED);
            if opts.is_hidden(group) {
                continue;
            }
            let buckets = years.entry(txn.date.year()).or_default();

            if opts.is_monthly(group) {
                let key = (
                    group.to_string(),
                    txn.category.clone(),
                    txn.display_name().to_string(),
                );
                let months = buckets.monthly.entry(key).or_insert([Decimal::ZERO; 12]);
                months[txn.date.month0() as usize] += txn.amount;
            } else {
                buckets
                    .groups
                    .entry(group.to_string())
                    .or_default()
                    .entry(txn.category.clone())
                    .or_default()
                    .push(txn.clone());
            }
        }

        let years = years
            .into_iter()
            .map(|(year, buckets)| YearReport {
                year,
                groups: buckets
                    .groups
                    .into_iter()
                    .map(|(group, categories)| GroupSection {
                        group,
                        categories: categories.into_iter().map(category_section).collect(),
                    })
                    .collect(),
                monthly: buckets
                    .monthly
                    .into_iter()
                    .map(|((group, category, vendor), months)| MonthlyRow {
                        group,
                        category,
                        vendor,
                        total: months.iter().copied().sum(),
                        months,
                    })
                    .collect(),
            })
            .collect();

        Self { years }
    }

    pub fn year(&self, year: i32) -> Option<&YearReport> {
        self.years.iter().find(|y| y.year == year)
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

fn category_section((category, mut transactions): (String, Vec<Transaction>)) -> CategorySection {
    transactions.sort_by_key(|t| (t.date, t.sequence_index));
    let total = transactions.iter().map(|t| t.amount).sum();
    CategorySection {
        category,
        transactions,
        total,
    }
}
