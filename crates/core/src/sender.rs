use std::future::Future;

use crate::error::SenderError;
use crate::model::span::{SpanLog, SpanTag};

/// Everything a sender needs to emit one span.
///
/// Identifiers are hyphenated UUID strings. `parents` and `follows_from` are
/// empty for a root span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanData {
    pub name: String,
    pub start_millis: i64,
    pub duration_millis: i64,
    pub source: String,
    pub trace_id: String,
    pub span_id: String,
    pub parents: Vec<String>,
    pub follows_from: Vec<String>,
    pub tags: Vec<SpanTag>,
    pub span_logs: Vec<SpanLog>,
}

/// Sends spans to Tanzu Observability, typically through a Wavefront proxy.
///
/// The exporter may call a sender from several tasks at once, so
/// implementations have to serialize internally where needed.
pub trait SpanSender: Send + Sync {
    fn send_span(&self, span: SpanData) -> impl Future<Output = Result<(), SenderError>> + Send;

    fn flush(&self) -> impl Future<Output = Result<(), SenderError>> + Send;

    fn close(&self) -> impl Future<Output = ()> + Send;
}
