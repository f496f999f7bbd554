// File: ./src/json.rs
//! JSON conveniences over `serde_json` maps and byte buffers.
use serde::Serialize;
use serde_json::{Map, Value};

/// Copies every entry of `other` into `target`; keys present in both take
/// `other`'s value.
pub fn append_map(target: &mut Map<String, Value>, other: Map<String, Value>) {
    for (key, value) in other {
        target.insert(key, value);
    }
}

/// Compact JSON text for a map.
pub fn json_string(map: &Map<String, Value>) -> Option<String> {
    serde_json::to_string(map).ok()
}

/// Decodes any JSON document, bare fragments (`42`, `"x"`, `null`) included.
pub fn value_from_json(bytes: &[u8]) -> Option<Value> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("Rejected JSON payload: {}", e);
            None
        }
    }
}

/// Pretty-printed JSON bytes for any serialisable value.
pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Option<Vec<u8>> {
    serde_json::to_vec_pretty(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_append_map() {
        let mut dict = map(json!({"String": "Test", "Int": 123}));
        append_map(&mut dict, map(json!({"Double": 123.45})));
        assert_eq!(
            Value::Object(dict.clone()),
            json!({"String": "Test", "Int": 123, "Double": 123.45})
        );

        append_map(&mut dict, map(json!({"Int": 7})));
        assert_eq!(dict["Int"], json!(7));
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_json_string() {
        let dict = map(json!({"String": "Test", "Int": 123, "dict": {"foo": "bar"}}));
        let text = json_string(&dict).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), Value::Object(dict));
    }

    #[test]
    fn test_value_from_json() {
        assert_eq!(value_from_json(b"{\"a\": [1, 2]}"), Some(json!({"a": [1, 2]})));
        assert_eq!(value_from_json(b"42"), Some(json!(42)));
        assert_eq!(value_from_json(b"\"fragment\""), Some(json!("fragment")));
        assert_eq!(value_from_json(b"{broken"), None);
    }

    #[test]
    fn test_to_json_bytes_is_pretty() {
        let bytes = to_json_bytes(&json!({"a": 1})).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(value_from_json(text.as_bytes()), Some(json!({"a": 1})));
    }
}
