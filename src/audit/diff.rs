//! Field-level diffs for audit entries
//!
//! Only top-level fields are compared; nested collections are summarized by
//! their length so that an edited project does not dump its whole ledger.

use serde_json::Value;

const MAX_STRING_CHARS: usize = 50;

/// Describe what changed between two JSON values, or `None` if nothing did
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut changes = Vec::new();

            for (key, before_val) in before_obj {
                match after_obj.get(key) {
                    Some(after_val) if after_val != before_val => changes.push(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(before_val),
                        format_value(after_val)
                    )),
                    Some(_) => {}
                    None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) {
                    changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
                }
            }
            changes
        }
        _ if before != after => vec![format!("{} -> {}", format_value(before), format_value(after))],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > MAX_STRING_CHARS => {
            let head: String = s.chars().take(MAX_STRING_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_fields_only() {
        let before = json!({"name": "Bridge", "budget": 100000, "status": "planning"});
        let after = json!({"name": "Bridge", "budget": 120000, "status": "in_execution"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("budget: 100000 -> 120000"));
        assert!(diff.contains("status: \"planning\" -> \"in_execution\""));
        assert!(!diff.contains("name"));
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"name": "Bridge", "tax_rate": 600});
        let after = json!({"name": "Bridge", "commission_rate": 1500});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("tax_rate: 600 -> (removed)"));
        assert!(diff.contains("commission_rate: (added) -> 1500"));
    }

    #[test]
    fn test_no_changes() {
        let value = json!({"amount": 100});
        assert!(generate_diff(&value, &value).is_none());
    }

    #[test]
    fn test_collections_are_summarized() {
        let before = json!({"costs": [1, 2]});
        let after = json!({"costs": [1, 2, 3]});
        assert_eq!(generate_diff(&before, &after).unwrap(), "costs: [2 items] -> [3 items]");
    }

    #[test]
    fn test_long_multibyte_string_truncation() {
        let before = json!({"description": "ç".repeat(80)});
        let after = json!({"description": "short"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("...\""));
    }
}
