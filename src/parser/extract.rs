//! Key lookup over arbitrary JSON search results.

use serde_json::Value;
use tracing::debug;

use crate::utils::constants::HTS_CODE_KEY;

/// Collect the values stored under `target_key`, depth-first, in document order.
///
/// A matching value is collected as is and not searched further; its siblings
/// still are. Objects are descended into, arrays only through their object
/// elements. Scalars and arrays of scalars end the walk.
pub fn find_values_by_key<'a>(tree: &'a Value, target_key: &str) -> Vec<&'a Value> {
    let mut found = Vec::new();
    match tree {
        Value::Object(_) => search(tree, target_key, &mut found),
        Value::Array(items) => search_items(items, target_key, &mut found),
        _ => {}
    }
    found
}

fn search<'a>(node: &'a Value, target_key: &str, found: &mut Vec<&'a Value>) {
    let Value::Object(map) = node else {
        return;
    };
    for (key, value) in map {
        if key == target_key {
            found.push(value);
            continue;
        }
        match value {
            Value::Object(_) => search(value, target_key, found),
            Value::Array(items) => search_items(items, target_key, found),
            _ => {}
        }
    }
}

fn search_items<'a>(items: &'a [Value], target_key: &str, found: &mut Vec<&'a Value>) {
    for item in items.iter().filter(|item| item.is_object()) {
        search(item, target_key, found);
    }
}

/// Remove repeated values, keeping the first occurrence
pub fn remove_duplicates<'a>(values: Vec<&'a Value>) -> Vec<&'a Value> {
    let mut unique: Vec<&Value> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

/// Tariff codes found in a search result.
///
/// Duplicates are removed on the raw values first, then every `.` is stripped,
/// so "8541.10.0050" becomes "8541100050". Nulls are dropped; other
/// non-string values are skipped.
pub fn extract_hts_codes(tree: &Value) -> Vec<String> {
    remove_duplicates(find_values_by_key(tree, HTS_CODE_KEY))
        .into_iter()
        .filter(|value| !value.is_null())
        .filter_map(|value| match value.as_str() {
            Some(code) => Some(code.replace('.', "")),
            None => {
                debug!(value = %value, "skipping non-string {}", HTS_CODE_KEY);
                None
            }
        })
        .collect()
}
