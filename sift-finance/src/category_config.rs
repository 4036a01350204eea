//! Load category rules from `categories.json`.
//!
//! Shape: `{ "<group>": { "<category>": { "<pattern>": "<vendor>" | null } } }`.
//! File order is rule order; a `null` vendor means "use the pattern".

use anyhow::{Context, Result, bail};
use log::debug;
use serde_json::{Map, Value};
use sift_core::{CategoryRule, CategoryRuleSet};
use std::fs;
use std::path::Path;

fn as_object<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("{what} must be an object, found {other}"),
    }
}

/// Parse category rules from JSON text.
pub fn parse_categories_json(json: &str) -> Result<CategoryRuleSet> {
    let root: Value = serde_json::from_str(json).context("parse categories json")?;
    let mut rules = CategoryRuleSet::default();

    for (group, categories) in as_object(&root, "top level")? {
        for (category, patterns) in as_object(categories, &format!("group {group:?}"))? {
            for (pattern, vendor) in as_object(patterns, &format!("category {category:?}"))? {
                let vendor = match vendor {
                    Value::Null => None,
                    Value::String(s) => Some(s.as_str()),
                    other => bail!("vendor for pattern {pattern:?} must be a string or null, found {other}"),
                };
                if pattern.is_empty() {
                    bail!("empty pattern in {group:?} / {category:?}");
                }
                rules.push(CategoryRule::new(group.as_str(), category.as_str(), pattern.as_str(), vendor));
            }
        }
    }

    Ok(rules)
}

/// Load the category rule file at `path`.
pub fn load_categories(path: impl AsRef<Path>) -> Result<CategoryRuleSet> {
    let path = path.as_ref();
    debug!("loading categories from {}", path.display());
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let rules = parse_categories_json(&s).with_context(|| format!("load {}", path.display()))?;
    debug!("loaded {} category rules", rules.len());
    Ok(rules)
}
