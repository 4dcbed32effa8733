use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use opentelemetry_proto::tonic::common::v1::any_value::Value;
use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue};

/// Flattens attribute sets into string tags. Sets are applied in order, so a
/// key in a later set overwrites the same key from an earlier one.
pub fn attributes_to_tags(attributes: &[&[KeyValue]]) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for set in attributes {
        for kv in *set {
            tags.insert(kv.key.clone(), any_value_to_string(kv.value.as_ref()));
        }
    }
    tags
}

pub fn any_value_to_string(value: Option<&AnyValue>) -> String {
    let Some(value) = value.and_then(|v| v.value.as_ref()) else {
        return String::new();
    };
    match value {
        Value::StringValue(s) => s.clone(),
        Value::BoolValue(b) => b.to_string(),
        Value::IntValue(i) => i.to_string(),
        Value::DoubleValue(d) => d.to_string(),
        Value::BytesValue(b) => STANDARD.encode(b),
        Value::ArrayValue(_) | Value::KvlistValue(_) => to_json(value).to_string(),
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::StringValue(s) => serde_json::Value::String(s.clone()),
        Value::BoolValue(b) => serde_json::Value::Bool(*b),
        Value::IntValue(i) => serde_json::Value::from(*i),
        Value::DoubleValue(d) => serde_json::Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::BytesValue(b) => serde_json::Value::String(STANDARD.encode(b)),
        Value::ArrayValue(array) => serde_json::Value::Array(
            array
                .values
                .iter()
                .map(|v| v.value.as_ref().map_or(serde_json::Value::Null, to_json))
                .collect(),
        ),
        Value::KvlistValue(list) => {
            let mut map = serde_json::Map::new();
            for kv in &list.values {
                let inner = kv
                    .value
                    .as_ref()
                    .and_then(|v| v.value.as_ref())
                    .map_or(serde_json::Value::Null, to_json);
                map.insert(kv.key.clone(), inner);
            }
            serde_json::Value::Object(map)
        }
    }
}
