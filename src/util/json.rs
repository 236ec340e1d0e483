use serde_json::Value;

/// Non-empty string at `key`.
pub fn str_at(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// `value.key.nodes` as a slice, empty when any step is missing or null.
pub fn nodes_at<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(|c| c.get("nodes"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Object member that is present and not null.
pub fn present<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// Numbers pass through, numeric strings are parsed, everything else is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub fn u64_at(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(coerce_number).map(|n| n.max(0.0) as u64)
}

/// Best-effort typed view of a JSON node; malformed input yields `None`.
pub fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}
