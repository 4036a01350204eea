//! Ordered category rules over transaction descriptions.
//!
//! Rules are plain substring predicates evaluated in configured order; the
//! first one that matches wins. No regex, no scoring.

use serde::{Deserialize, Serialize};

/// Category label given to transactions no rule matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single configured rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRule {
    /// Report group ("page") the category belongs to
    pub group: String,
    pub category: String,
    /// Substring searched for in the description (case-sensitive)
    pub pattern: String,
    /// Friendly vendor name shown in reports
    pub vendor: String,
}

impl CategoryRule {
    pub fn new(
        group: impl Into<String>,
        category: impl Into<String>,
        pattern: impl Into<String>,
        vendor: Option<&str>,
    ) -> Self {
        let pattern = pattern.into();
        Self {
            group: group.into(),
            category: category.into(),
            vendor: vendor.map(str::to_string).unwrap_or_else(|| pattern.clone()),
            pattern,
        }
    }

    pub fn matches(&self, description: &str) -> bool {
        !self.pattern.is_empty() && description.contains(&self.pattern)
    }
}

/// Outcome of categorizing one description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMatch<'a> {
    Rule(&'a CategoryRule),
    Uncategorized,
}

impl<'a> CategoryMatch<'a> {
    pub fn category(&self) -> &'a str {
        match self {
            CategoryMatch::Rule(rule) => &rule.category,
            CategoryMatch::Uncategorized => UNCATEGORIZED,
        }
    }

    pub fn rule(&self) -> Option<&'a CategoryRule> {
        match self {
            CategoryMatch::Rule(rule) => Some(rule),
            CategoryMatch::Uncategorized => None,
        }
    }
}

/// Read-only rule set shared by every parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRuleSet {
    rules: Vec<CategoryRule>,
}

impl CategoryRuleSet {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Append a rule at the lowest priority
    pub fn push(&mut self, rule: CategoryRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule, in configured order, whose pattern occurs in `description`.
    pub fn categorize(&self, description: &str) -> CategoryMatch<'_> {
        self.rules
            .iter()
            .find(|rule| rule.matches(description))
            .map(CategoryMatch::Rule)
            .unwrap_or(CategoryMatch::Uncategorized)
    }
}

impl FromIterator<CategoryRule> for CategoryRuleSet {
    fn from_iter<T: IntoIterator<Item = CategoryRule>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
