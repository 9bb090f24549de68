use serde_json::Value;

/// Elements of a JSON-encoded array. Anything that is not a JSON array
/// (malformed text, `null`, `"undefined"`, objects, scalars) yields nothing.
pub fn parse_json_array(raw: Option<&str>) -> Vec<Value> {
    match raw.map(serde_json::from_str::<Value>) {
        Some(Ok(Value::Array(items))) => items,
        _ => Vec::new(),
    }
}

/// Like [`parse_json_array`] but flattened to strings; scalars are rendered,
/// nulls dropped.
pub fn parse_string_list(raw: Option<&str>) -> Vec<String> {
    parse_json_array(raw).into_iter().filter_map(into_string).collect()
}

/// Native JSON array columns (`pros`, `cons`). Rows still holding the legacy
/// encoded string are decoded on the fly.
pub fn native_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().cloned().filter_map(into_string).collect(),
        Some(Value::String(encoded)) => parse_string_list(Some(encoded)),
        _ => Vec::new(),
    }
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
