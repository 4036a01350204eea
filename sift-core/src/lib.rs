//! sift-core: transaction, category-rule, money and date-token types shared
//! by the statement engine and its collaborators.

pub mod categories;
pub mod dates;
pub mod money;
pub mod transaction;

pub use categories::{CategoryMatch, CategoryRule, CategoryRuleSet, UNCATEGORIZED};
pub use dates::{DateMarker, DateStyle, LeadingDates, YearTracker};
pub use money::MoneyToken;
pub use transaction::{DebitKind, DebitRef, Transaction};
