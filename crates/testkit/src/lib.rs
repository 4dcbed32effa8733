use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::any_value::Value;
use opentelemetry_proto::tonic::common::v1::{AnyValue, InstrumentationScope, KeyValue};
use opentelemetry_proto::tonic::resource::v1::Resource;
use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span};
use tanzu_core::error::SenderError;
use tanzu_core::sender::{SpanData, SpanSender};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Span sender that keeps everything it is given, with switchable failures.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SpanData>>,
    failing_names: HashSet<String>,
    fail_flush: bool,
    cancel_after: Option<(usize, CancellationToken)>,
    flushes: AtomicUsize,
    closes: AtomicUsize,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any span with this name at send time.
    pub fn fail_sends_for(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    pub fn fail_flushes(mut self) -> Self {
        self.fail_flush = true;
        self
    }

    /// Cancels `token` once `sends` spans have been accepted.
    pub fn cancel_after(mut self, sends: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((sends, token));
        self
    }

    pub async fn sent(&self) -> Vec<SpanData> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_names(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl SpanSender for RecordingSender {
    async fn send_span(&self, span: SpanData) -> Result<(), SenderError> {
        if self.failing_names.contains(&span.name) {
            return Err(SenderError::new(format!("rejected span {}", span.name)));
        }
        let mut sent = self.sent.lock().await;
        sent.push(span);
        if let Some((after, token)) = &self.cancel_after
            && sent.len() >= *after
        {
            token.cancel();
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), SenderError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.fail_flush {
            return Err(SenderError::new("flush failed"));
        }
        Ok(())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn string_kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(Value::StringValue(value.to_string())),
        }),
    }
}

/// A valid span whose ids are derived from `seed`.
pub fn sample_span(name: &str, seed: u8) -> Span {
    Span {
        trace_id: vec![seed; 16],
        span_id: vec![seed; 8],
        name: name.to_string(),
        start_time_unix_nano: 1_700_000_000_000_000_000,
        end_time_unix_nano: 1_700_000_000_100_000_000,
        ..Default::default()
    }
}

pub fn resource_spans(resource_attrs: Vec<KeyValue>, spans: Vec<Span>) -> ResourceSpans {
    ResourceSpans {
        resource: Some(Resource {
            attributes: resource_attrs,
            ..Default::default()
        }),
        scope_spans: vec![ScopeSpans {
            scope: Some(InstrumentationScope {
                name: "testkit".to_string(),
                ..Default::default()
            }),
            spans,
            ..Default::default()
        }],
        ..Default::default()
    }
}

pub fn trace_request(resource_spans: Vec<ResourceSpans>) -> ExportTraceServiceRequest {
    ExportTraceServiceRequest { resource_spans }
}
