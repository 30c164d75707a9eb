use crate::config::error::BoxError;
use crate::config::value::{Map, Value};

pub(super) fn decode(blob: &[u8]) -> Result<Map, BoxError> {
    let value: Value = serde_json::from_slice(blob)?;
    super::into_root(value)
}

pub(super) fn encode(data: &Map) -> Result<Vec<u8>, BoxError> {
    Ok(serde_json::to_vec(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_object() {
        let map = decode(br#"{"name": "app", "age": 123, "list": [1, "a"]}"#).unwrap();
        assert_eq!(map["name"], Value::from("app"));
        assert_eq!(map["age"], Value::from(123));
        assert_eq!(map["list"], Value::from(vec![Value::from(1), Value::from("a")]));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(decode(b"[1, 2]").is_err());
        assert!(decode(b"{not json").is_err());
    }

    #[test]
    fn test_encode() {
        let map = decode(br#"{"b": 1, "a": {"c": true}}"#).unwrap();
        let out = encode(&map).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"{"a":{"c":true},"b":1}"#);
    }
}
