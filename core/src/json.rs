//! Untrusted JSON parsing.
//!
//! Bodies from the upstream service are parsed into a [`serde_json::Value`]
//! through a custom visitor that refuses object keys which would rewrite an
//! object's prototype in a JavaScript consumer of the same data. A document
//! containing any of [`FORBIDDEN_KEYS`], at any depth, is a parse error, not
//! a value with the key silently dropped.

use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

/// Object keys rejected during parsing.
pub const FORBIDDEN_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// Parse `text` as a single JSON document, rejecting forbidden keys.
///
/// Trailing non-whitespace after the document is an error, as is an empty
/// input.
pub fn parse_untrusted(text: &str) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(text);
    let value = SafeValue.deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

struct SafeValue;

impl<'de> DeserializeSeed<'de> for SafeValue {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SafeVisitor)
    }
}

struct SafeVisitor;

impl<'de> Visitor<'de> for SafeVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any valid JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        SafeValue.deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(SafeValue)? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            if FORBIDDEN_KEYS.contains(&key.as_str()) {
                return Err(de::Error::custom(format!(
                    "object contains forbidden prototype property \"{key}\""
                )));
            }
            let value = map.next_value_seed(SafeValue)?;
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}
