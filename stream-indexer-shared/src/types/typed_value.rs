//! Typed attribute values as they appear in table stream records.
//!
//! Every attribute in a stream image is wrapped in a single-key object naming
//! its type (`{"S": "text"}`, `{"N": "42"}`, `{"M": {...}}`, ...). This module
//! models that encoding as [`TypedValue`] and projects it onto plain JSON for
//! indexing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A record image or key: attribute name to typed value.
pub type Item = BTreeMap<String, TypedValue>;

/// A single attribute value in the stream's typed encoding.
///
/// Numbers keep their decimal text until transcoding, so no precision is lost
/// while the value is in flight. Encodings this type does not know about
/// (binary values, for example) are kept verbatim in [`TypedValue::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "BOOL")]
    Boolean(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "M")]
    Map(Item),
    #[serde(rename = "L")]
    List(Vec<TypedValue>),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
    /// Any encoding not listed above, passed through unchanged.
    #[serde(untagged)]
    Other(Value),
}

impl TypedValue {
    /// Project the typed value onto an untagged JSON value.
    ///
    /// Maps and lists are transcoded recursively. String and number sets
    /// become plain arrays, so set semantics are not preserved. Unknown
    /// encodings are returned as-is.
    pub fn transcode(&self) -> Value {
        match self {
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Number(n) => number_value(n),
            TypedValue::Boolean(b) => Value::Bool(*b),
            TypedValue::Null(_) => Value::Null,
            TypedValue::Map(item) => Value::Object(transcode_item(item)),
            TypedValue::List(values) => {
                Value::Array(values.iter().map(TypedValue::transcode).collect())
            }
            TypedValue::StringSet(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
            TypedValue::NumberSet(values) => {
                Value::Array(values.iter().map(|n| number_value(n)).collect())
            }
            TypedValue::Other(raw) => raw.clone(),
        }
    }
}

/// Transcode every attribute of an item into a JSON object.
pub fn transcode_item(item: &Item) -> Map<String, Value> {
    item.iter()
        .map(|(name, value)| (name.clone(), value.transcode()))
        .collect()
}

/// Convert the decimal text of a stream number into a JSON number.
///
/// Integral text becomes an integer when it fits in 64 bits; anything else is
/// read as a float. Text that is not a finite number is kept as a string.
fn number_value(text: &str) -> Value {
    let trimmed = text.trim();

    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Value::from(u);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}
