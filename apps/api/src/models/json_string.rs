//! Serde adapter for attributes stored as JSON text.
//!
//! Writes the value as a JSON string. Reads either a JSON string or an
//! already-decoded value, since older documents hold both.

use serde::{de, de::DeserializeOwned, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let text = serde_json::to_string(value).map_err(ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => serde_json::from_str(&text).map_err(de::Error::custom),
        other => serde_json::from_value(other).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "super")]
        items: Vec<u32>,
    }

    #[test]
    fn test_writes_json_text() {
        let v = serde_json::to_value(Holder { items: vec![1, 2] }).unwrap();
        assert_eq!(v, json!({"items": "[1,2]"}));
    }

    #[test]
    fn test_reads_text_or_array() {
        let from_text: Holder = serde_json::from_value(json!({"items": "[3,4]"})).unwrap();
        let from_array: Holder = serde_json::from_value(json!({"items": [3, 4]})).unwrap();
        assert_eq!(from_text, from_array);
    }

    #[test]
    fn test_rejects_garbage_text() {
        assert!(serde_json::from_value::<Holder>(json!({"items": "not json"})).is_err());
    }
}
