//! Named-field search over execution details

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

/// Requested field name to its value; `None` when the field was not found.
pub type FieldResults = IndexMap<String, Option<JsonValue>>;

const WRAPPED_VALUE_KEY: &str = "value";

/// Find the first occurrence of `name` in `node`, depth-first in document order.
///
/// A match whose value is an object with a `value` key yields that inner
/// value unchanged. Any other match yields the string form of the raw value.
/// A wrapped `null` means the field is absent under this object: nothing else
/// in it is searched, and the caller moves on to the next sibling.
pub fn find_field(node: &JsonValue, name: &str) -> Option<JsonValue> {
    match node {
        JsonValue::Object(map) => {
            if let Some(raw) = map.get(name) {
                match raw.as_object().and_then(|inner| inner.get(WRAPPED_VALUE_KEY)) {
                    Some(JsonValue::Null) => return None,
                    Some(wrapped) => return Some(wrapped.clone()),
                    None => return Some(JsonValue::String(value_to_text(raw))),
                }
            }
            map.values().find_map(|child| find_field(child, name))
        }
        JsonValue::Array(items) => items.iter().find_map(|item| find_field(item, name)),
        _ => None,
    }
}

/// String form of a JSON value: strings verbatim, everything else as JSON text.
pub fn value_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Run [`find_field`] once per name.
pub fn extract_fields<S: AsRef<str>>(detail: &JsonValue, names: &[S]) -> FieldResults {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            (name.to_string(), find_field(detail, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapped_value_is_unwrapped() {
        assert_eq!(find_field(&json!({"foo": {"value": "bar"}}), "foo"), Some(json!("bar")));
        assert_eq!(find_field(&json!({"foo": {"value": 7}}), "foo"), Some(json!(7)));
        assert_eq!(
            find_field(&json!({"foo": {"value": {"a": 1}, "type": "obj"}}), "foo"),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_raw_values_are_stringified() {
        assert_eq!(find_field(&json!({"foo": 42}), "foo"), Some(json!("42")));
        assert_eq!(find_field(&json!({"foo": "bar"}), "foo"), Some(json!("bar")));
        assert_eq!(find_field(&json!({"foo": true}), "foo"), Some(json!("true")));
        assert_eq!(find_field(&json!({"foo": null}), "foo"), Some(json!("null")));
        assert_eq!(find_field(&json!({"foo": {"x": 1}}), "foo"), Some(json!(r#"{"x":1}"#)));
        assert_eq!(find_field(&json!({"foo": [1, 2]}), "foo"), Some(json!("[1,2]")));
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let detail = json!({
            "code": 0,
            "data": {
                "status": "pass",
                "steps": [
                    {"name": "init"},
                    {"name": "apply", "context": {"channelLoanApplyId": {"value": "L-1"}}}
                ]
            }
        });

        assert_eq!(find_field(&detail, "channelLoanApplyId"), Some(json!("L-1")));
        assert_eq!(find_field(&detail, "status"), Some(json!("pass")));
        assert_eq!(find_field(&json!([[{"deep": 1}]]), "deep"), Some(json!("1")));
    }

    #[test]
    fn test_first_match_in_document_order() {
        let detail = json!({
            "first": {"target": {"value": "from-first"}},
            "second": {"target": {"value": "from-second"}}
        });
        assert_eq!(find_field(&detail, "target"), Some(json!("from-first")));

        let detail = json!({
            "z": {"target": "deep-z"},
            "a": {"target": "deep-a"}
        });
        assert_eq!(find_field(&detail, "target"), Some(json!("deep-z")));

        // a key at the current level wins over a deeper earlier one
        let detail = json!({"inner": {"target": "deep"}, "target": "shallow"});
        assert_eq!(find_field(&detail, "target"), Some(json!("shallow")));
    }

    #[test]
    fn test_missing_field_and_scalar_roots() {
        assert_eq!(find_field(&json!({"a": {"b": 1}}), "missing"), None);
        assert_eq!(find_field(&json!("foo"), "foo"), None);
        assert_eq!(find_field(&json!(3), "foo"), None);
        assert_eq!(find_field(&JsonValue::Null, "foo"), None);
        assert_eq!(find_field(&json!([]), "foo"), None);
    }

    #[test]
    fn test_wrapped_null_stops_at_its_object() {
        assert_eq!(find_field(&json!({"foo": {"value": null}}), "foo"), None);
        assert_eq!(
            find_field(&json!({"foo": {"value": null}, "bar": {"foo": "x"}}), "foo"),
            None
        );
        assert_eq!(
            find_field(&json!({"foo": {"value": null, "foo": "inner"}}), "foo"),
            None
        );
        // the parent still moves on to later siblings
        assert_eq!(
            find_field(&json!({"a": {"foo": {"value": null}}, "b": {"foo": {"value": "b"}}}), "foo"),
            Some(json!("b"))
        );
    }

    #[test]
    fn test_extract_fields_keeps_request_order() {
        let detail = json!({"data": {"context": {"x": {"value": "1"}, "y": 2}}});

        let results = extract_fields(&detail, &["y", "missing", "x"]);

        let keys: Vec<&str> = results.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["y", "missing", "x"]);
        assert_eq!(results["y"], Some(json!("2")));
        assert_eq!(results["missing"], None);
        assert_eq!(results["x"], Some(json!("1")));

        let empty: [&str; 0] = [];
        assert!(extract_fields(&detail, &empty).is_empty());
    }
}
