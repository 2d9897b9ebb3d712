//! Structural bounds for layout payloads (footer, showcase, home categories,
//! navigation menu).
//!
//! These replace the clamps the admin screens used to apply client-side.
//! Walks over nested payloads stop at the configured bounds.

use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::config::{FooterRules, HomeCategoryRules, NavMenuRules, ShowcaseRules};
use crate::model::{ValidationEntry, ValidationReport};
use crate::validators::{object_payload, Validator, ValidatorError};

fn missing_field(field: &str, expected: &str) -> ValidationEntry {
    ValidationEntry::error(
        "missing_field",
        format!("`{field}` is required ({expected})"),
        json!({ "field": field }),
    )
}

fn wrong_type(field: &str, expected: &str) -> ValidationEntry {
    ValidationEntry::error(
        "invalid_shape",
        format!("`{field}` must be {expected}"),
        json!({ "field": field }),
    )
}

/// Read an integer field and check it lies in `[min, max]`.
fn bounded_int(
    root: &Map<String, Value>,
    field: &str,
    min: u64,
    max: u64,
    required: bool,
    entries: &mut Vec<ValidationEntry>,
) -> Option<u64> {
    let value = match root.get(field) {
        Some(value) => value,
        None => {
            if required {
                entries.push(missing_field(field, "an integer"));
            }
            return None;
        }
    };
    let Some(n) = value.as_u64() else {
        entries.push(wrong_type(field, "a non-negative integer"));
        return None;
    };
    if n < min || n > max {
        entries.push(ValidationEntry::error(
            "out_of_range",
            format!("`{field}` is {n}; allowed range is {min}..={max}"),
            json!({ "field": field, "value": n, "min": min, "max": max }),
        ));
        return None;
    }
    Some(n)
}

fn non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Footer columns and their links.
#[derive(Debug, Clone)]
pub struct FooterLayoutValidator {
    rules: FooterRules,
}

impl FooterLayoutValidator {
    pub fn new(rules: FooterRules) -> Self {
        Self { rules }
    }
}

impl Validator for FooterLayoutValidator {
    fn name(&self) -> &'static str {
        "footer_layout"
    }

    fn validate(&self, payload: &Value) -> Result<ValidationReport, ValidatorError> {
        let mut entries = Vec::new();
        let Some(root) = object_payload("footer layout", payload, &mut entries) else {
            return Ok(ValidationReport::from_entries(entries));
        };

        let columns = match root.get("columns") {
            Some(Value::Array(columns)) => columns,
            Some(_) => {
                entries.push(wrong_type("columns", "an array"));
                return Ok(ValidationReport::from_entries(entries));
            }
            None => {
                entries.push(missing_field("columns", "an array of footer columns"));
                return Ok(ValidationReport::from_entries(entries));
            }
        };

        let (min, max) = (self.rules.min_columns, self.rules.max_columns);
        if columns.len() < min || columns.len() > max {
            entries.push(ValidationEntry::error(
                "column_count_out_of_range",
                format!(
                    "footer has {} columns; allowed range is {min}..={max}",
                    columns.len()
                ),
                json!({ "field": "columns", "count": columns.len(), "min": min, "max": max }),
            ));
        }

        for (i, column) in columns.iter().enumerate() {
            let path = format!("columns[{i}]");
            let Some(column) = column.as_object() else {
                entries.push(wrong_type(&path, "an object"));
                continue;
            };
            if !non_empty_str(column.get("title")) {
                entries.push(ValidationEntry::warning(
                    "column_missing_title",
                    format!("{path} has no title"),
                    json!({ "field": format!("{path}.title") }),
                ));
            }
            match column.get("links") {
                None => {}
                Some(Value::Array(links)) if links.len() > self.rules.max_links_per_column => {
                    entries.push(ValidationEntry::error(
                        "too_many_links",
                        format!(
                            "{path} has {} links; at most {} allowed",
                            links.len(),
                            self.rules.max_links_per_column
                        ),
                        json!({ "field": format!("{path}.links"), "count": links.len() }),
                    ));
                }
                Some(Value::Array(_)) => {}
                Some(_) => entries.push(wrong_type(&format!("{path}.links"), "an array")),
            }
        }

        Ok(ValidationReport::from_entries(entries))
    }
}

/// Showcase grid dimensions.
#[derive(Debug, Clone)]
pub struct ShowcaseLayoutValidator {
    rules: ShowcaseRules,
}

impl ShowcaseLayoutValidator {
    pub fn new(rules: ShowcaseRules) -> Self {
        Self { rules }
    }
}

impl Validator for ShowcaseLayoutValidator {
    fn name(&self) -> &'static str {
        "showcase_layout"
    }

    fn validate(&self, payload: &Value) -> Result<ValidationReport, ValidatorError> {
        let mut entries = Vec::new();
        let Some(root) = object_payload("showcase layout", payload, &mut entries) else {
            return Ok(ValidationReport::from_entries(entries));
        };

        let rows = bounded_int(root, "rows", 1, self.rules.max_rows, true, &mut entries);
        let columns = bounded_int(root, "columns", 1, self.rules.max_columns, true, &mut entries);

        match root.get("items") {
            None => {}
            Some(Value::Array(items)) => {
                if let (Some(rows), Some(columns)) = (rows, columns) {
                    let cells = rows * columns;
                    if items.len() as u64 > cells {
                        entries.push(ValidationEntry::warning(
                            "items_exceed_grid",
                            format!(
                                "{} items configured for a {rows}x{columns} grid; {} will not be shown",
                                items.len(),
                                items.len() as u64 - cells
                            ),
                            json!({ "field": "items", "count": items.len(), "cells": cells }),
                        ));
                    }
                }
            }
            Some(_) => entries.push(wrong_type("items", "an array")),
        }

        Ok(ValidationReport::from_entries(entries))
    }
}

/// Home page category tiles.
#[derive(Debug, Clone)]
pub struct HomeCategoryLayoutValidator {
    rules: HomeCategoryRules,
}

impl HomeCategoryLayoutValidator {
    pub fn new(rules: HomeCategoryRules) -> Self {
        Self { rules }
    }
}

impl Validator for HomeCategoryLayoutValidator {
    fn name(&self) -> &'static str {
        "home_category_layout"
    }

    fn validate(&self, payload: &Value) -> Result<ValidationReport, ValidatorError> {
        let mut entries = Vec::new();
        let Some(root) = object_payload("home category layout", payload, &mut entries) else {
            return Ok(ValidationReport::from_entries(entries));
        };

        bounded_int(root, "columns", 1, self.rules.max_columns, false, &mut entries);

        let categories = match root.get("categories") {
            Some(Value::Array(categories)) => categories,
            Some(_) => {
                entries.push(wrong_type("categories", "an array"));
                return Ok(ValidationReport::from_entries(entries));
            }
            None => {
                entries.push(missing_field("categories", "an array of category tiles"));
                return Ok(ValidationReport::from_entries(entries));
            }
        };

        if categories.len() > self.rules.max_categories {
            entries.push(ValidationEntry::error(
                "too_many_categories",
                format!(
                    "{} categories configured; at most {} allowed",
                    categories.len(),
                    self.rules.max_categories
                ),
                json!({ "field": "categories", "count": categories.len() }),
            ));
        }

        // Keyed by JSON text so "1" and 1 stay distinct.
        let mut seen = HashSet::new();
        for (i, category) in categories.iter().enumerate() {
            let path = format!("categories[{i}]");
            let id = match category.as_object().and_then(|c| c.get("id")) {
                Some(id @ Value::String(s)) if !s.is_empty() => id,
                Some(id @ Value::Number(_)) => id,
                _ => {
                    entries.push(ValidationEntry::error(
                        "missing_category_id",
                        format!("{path} needs a string or numeric `id`"),
                        json!({ "field": format!("{path}.id") }),
                    ));
                    continue;
                }
            };
            if !seen.insert(id.to_string()) {
                entries.push(ValidationEntry::error(
                    "duplicate_category",
                    format!("category {id} appears more than once"),
                    json!({ "field": format!("{path}.id"), "id": id }),
                ));
            }
        }

        Ok(ValidationReport::from_entries(entries))
    }
}

/// Navigation menu tree.
#[derive(Debug, Clone)]
pub struct NavMenuValidator {
    rules: NavMenuRules,
}

impl NavMenuValidator {
    pub fn new(rules: NavMenuRules) -> Self {
        Self { rules }
    }
}

impl Validator for NavMenuValidator {
    fn name(&self) -> &'static str {
        "nav_menu"
    }

    fn validate(&self, payload: &Value) -> Result<ValidationReport, ValidatorError> {
        let mut entries = Vec::new();
        let Some(root) = object_payload("navigation menu", payload, &mut entries) else {
            return Ok(ValidationReport::from_entries(entries));
        };

        let items = match root.get("items") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                entries.push(wrong_type("items", "an array"));
                return Ok(ValidationReport::from_entries(entries));
            }
            None => {
                entries.push(missing_field("items", "an array of menu items"));
                return Ok(ValidationReport::from_entries(entries));
            }
        };

        // Depth-first with an explicit stack; (item, depth, path).
        let mut stack: Vec<(&Value, usize, String)> = items
            .iter()
            .enumerate()
            .rev()
            .map(|(i, item)| (item, 1, format!("items[{i}]")))
            .collect();
        let mut visited = 0usize;

        while let Some((item, depth, path)) = stack.pop() {
            visited += 1;
            if visited > self.rules.max_items {
                entries.push(ValidationEntry::error(
                    "menu_too_large",
                    format!("menu has more than {} items", self.rules.max_items),
                    json!({ "field": "items", "max": self.rules.max_items }),
                ));
                break;
            }

            let Some(item) = item.as_object() else {
                entries.push(wrong_type(&path, "an object"));
                continue;
            };
            if !non_empty_str(item.get("label")) {
                entries.push(ValidationEntry::error(
                    "missing_label",
                    format!("{path} has no label"),
                    json!({ "field": format!("{path}.label") }),
                ));
            }

            match item.get("children") {
                None => {}
                Some(Value::Array(children)) if children.is_empty() => {}
                Some(Value::Array(children)) => {
                    if depth + 1 > self.rules.max_depth {
                        entries.push(ValidationEntry::error(
                            "menu_too_deep",
                            format!(
                                "{path} nests below the maximum depth of {}",
                                self.rules.max_depth
                            ),
                            json!({ "field": format!("{path}.children"), "max_depth": self.rules.max_depth }),
                        ));
                        continue;
                    }
                    for (i, child) in children.iter().enumerate().rev() {
                        stack.push((child, depth + 1, format!("{path}.children[{i}]")));
                    }
                }
                Some(_) => entries.push(wrong_type(&format!("{path}.children"), "an array")),
            }
        }

        Ok(ValidationReport::from_entries(entries))
    }
}
