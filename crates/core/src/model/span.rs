use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A span in Tanzu Observability's model, ready to hand to a sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Span {
    pub name: String,
    pub trace_id: Uuid,
    pub span_id: Uuid,
    pub parent_span_id: Option<Uuid>,
    pub tags: BTreeMap<String, String>,
    pub start_millis: i64,
    pub duration_millis: i64,
    pub span_logs: Vec<SpanLog>,
}

impl Span {
    /// Flattens the tag map into the sender's key/value list, in key order.
    pub fn span_tags(&self) -> Vec<SpanTag> {
        self.tags
            .iter()
            .map(|(k, v)| SpanTag::new(k.clone(), v.clone()))
            .collect()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Keys may repeat within a tag list, e.g. `user=foo` and `user=bar`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpanTag {
    pub key: String,
    pub value: String,
}

impl SpanTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanLog {
    /// Microseconds since the unix epoch.
    pub timestamp: i64,
    pub fields: BTreeMap<String, String>,
}
