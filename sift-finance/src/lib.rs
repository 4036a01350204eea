//! sift-finance: category rule loading, debit corrections, expense report and CSV export

pub mod category_config;
pub mod corrections;
pub mod export;
pub mod report;

pub use category_config::{load_categories, parse_categories_json};
pub use corrections::drop_corrected_debits;
pub use export::{write_monthly_csv, write_report, write_transactions_csv, write_year_csv};
pub use report::{CategorySection, ExpenseReport, GroupSection, MonthlyRow, ReportOptions, YearReport};
