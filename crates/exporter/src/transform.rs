use std::collections::BTreeMap;

use opentelemetry_proto::tonic::common::v1::KeyValue;
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::span::{Event, SpanKind};
use opentelemetry_proto::tonic::trace::v1::status::StatusCode;
use opentelemetry_proto::tonic::trace::v1::{Span as OtlpSpan, Status};
use tanzu_core::config::TracesConfig;
use tanzu_core::error::Result;
use tanzu_core::ids::{parent_span_id_to_uuid, span_id_to_uuid, trace_id_to_uuid};
use tanzu_core::model::span::{Span, SpanLog};
use tanzu_core::time::{nanos_to_micros, span_times};

use crate::otlp::attrs::attributes_to_tags;

pub const LABEL_APPLICATION: &str = "application";
pub const LABEL_ERROR: &str = "error";
pub const LABEL_EVENT_NAME: &str = "name";
pub const LABEL_SERVICE: &str = "service";
pub const LABEL_SPAN_KIND: &str = "span.kind";
pub const LABEL_STATUS_MESSAGE: &str = "status.message";
pub const LABEL_STATUS_CODE: &str = "status.code";
pub const LABEL_W3C_TRACE_STATE: &str = "w3c.tracestate";
pub const ATTRIBUTE_SERVICE_NAME: &str = "service.name";

/// Longest rendering of a `key=value` tag the backend accepts.
const MAX_TAG_LENGTH: usize = 255;

/// Converts the spans of one resource. Build one per resource and reuse it
/// for every span underneath.
pub struct TraceTransformer<'a> {
    resource_attributes: &'a [KeyValue],
    config: &'a TracesConfig,
}

impl<'a> TraceTransformer<'a> {
    pub fn new(resource: Option<&'a Resource>, config: &'a TracesConfig) -> Self {
        Self {
            resource_attributes: resource.map(|r| r.attributes.as_slice()).unwrap_or(&[]),
            config,
        }
    }

    pub fn span(&self, orig: &OtlpSpan) -> Result<Span> {
        let trace_id = trace_id_to_uuid(&orig.trace_id)?;
        let span_id = span_id_to_uuid(&orig.span_id)?;
        let parent_span_id = parent_span_id_to_uuid(&orig.parent_span_id)?;

        let (start_millis, duration_millis) =
            span_times(orig.start_time_unix_nano, orig.end_time_unix_nano);

        let mut tags =
            attributes_to_tags(&[self.resource_attributes, orig.attributes.as_slice()]);
        self.set_required_tags(&mut tags);

        tags.insert(LABEL_SPAN_KIND.to_string(), span_kind(orig.kind).to_string());
        tags.extend(error_tags_from_status(orig.status.as_ref()));

        if !orig.trace_state.is_empty() {
            tags.insert(LABEL_W3C_TRACE_STATE.to_string(), orig.trace_state.clone());
        }

        Ok(Span {
            name: orig.name.clone(),
            trace_id,
            span_id,
            parent_span_id,
            tags,
            start_millis,
            duration_millis,
            span_logs: events_to_logs(&orig.events),
        })
    }

    fn set_required_tags(&self, tags: &mut BTreeMap<String, String>) {
        if !tags.contains_key(LABEL_SERVICE) {
            let service = tags
                .remove(ATTRIBUTE_SERVICE_NAME)
                .unwrap_or_else(|| self.config.default_service.clone());
            tags.insert(LABEL_SERVICE.to_string(), service);
        }
        if !tags.contains_key(LABEL_APPLICATION) {
            tags.insert(
                LABEL_APPLICATION.to_string(),
                self.config.default_application.clone(),
            );
        }
    }
}

fn span_kind(kind: i32) -> &'static str {
    match SpanKind::try_from(kind) {
        Ok(SpanKind::Client) => "client",
        Ok(SpanKind::Server) => "server",
        Ok(SpanKind::Producer) => "producer",
        Ok(SpanKind::Consumer) => "consumer",
        Ok(SpanKind::Internal) => "internal",
        Ok(SpanKind::Unspecified) => "unspecified",
        Err(_) => "unknown",
    }
}

fn error_tags_from_status(status: Option<&Status>) -> BTreeMap<String, String> {
    let code = status.map(|s| s.code).unwrap_or_default();
    let mut tags = BTreeMap::from([(LABEL_STATUS_CODE.to_string(), code.to_string())]);
    if code != StatusCode::Error as i32 {
        return tags;
    }

    tags.insert(LABEL_ERROR.to_string(), "true".to_string());
    if let Some(msg) = status.map(|s| s.message.as_str()).filter(|m| !m.is_empty()) {
        let max_len = MAX_TAG_LENGTH - (LABEL_STATUS_MESSAGE.len() + 1);
        tags.insert(
            LABEL_STATUS_MESSAGE.to_string(),
            truncate_bytes(msg, max_len).to_string(),
        );
    }
    tags
}

/// Cuts `s` to at most `max` bytes. A cut that would split a UTF-8 sequence
/// moves back to the preceding character boundary.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn events_to_logs(events: &[Event]) -> Vec<SpanLog> {
    events
        .iter()
        .map(|e| {
            let mut fields = attributes_to_tags(&[e.attributes.as_slice()]);
            fields.insert(LABEL_EVENT_NAME.to_string(), e.name.clone());
            SpanLog {
                timestamp: nanos_to_micros(e.time_unix_nano),
                fields,
            }
        })
        .collect()
}
