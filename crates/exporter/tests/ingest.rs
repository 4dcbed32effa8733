use std::sync::Arc;

use opentelemetry_proto::tonic::collector::trace::v1::trace_service_server::TraceService;
use opentelemetry_proto::tonic::trace::v1::Span;
use tanzu_core::config::TracesConfig;
use tanzu_exporter::Exporter;
use tanzu_exporter::otlp::grpc::TraceIngest;
use testkit::{RecordingSender, resource_spans, sample_span, string_kv, trace_request};
use tokio_util::sync::CancellationToken;
use tonic::{Code, Request};

#[tokio::test]
async fn export_forwards_all_spans() -> anyhow::Result<()> {
    let exporter = Arc::new(Exporter::new(
        TracesConfig::default(),
        RecordingSender::new(),
    ));
    let ingest = TraceIngest::new(Arc::clone(&exporter), CancellationToken::new());
    let req = trace_request(vec![resource_spans(
        vec![string_kv("service.name", "api")],
        vec![sample_span("GET /orders", 1), sample_span("SELECT orders", 2)],
    )]);

    let resp = ingest.export(Request::new(req)).await?.into_inner();

    assert!(resp.partial_success.is_none());
    assert_eq!(
        exporter.sender().sent_names().await,
        vec!["GET /orders", "SELECT orders"]
    );
    Ok(())
}

#[tokio::test]
async fn export_reports_rejected_spans() -> anyhow::Result<()> {
    let exporter = Arc::new(Exporter::new(
        TracesConfig::default(),
        RecordingSender::new(),
    ));
    let ingest = TraceIngest::new(Arc::clone(&exporter), CancellationToken::new());
    let bad_trace = Span {
        trace_id: vec![0; 16],
        ..sample_span("bad", 5)
    };
    let req = trace_request(vec![resource_spans(
        vec![],
        vec![sample_span("ok", 1), bad_trace],
    )]);

    let resp = ingest.export(Request::new(req)).await?.into_inner();

    let partial = resp.partial_success.expect("partial success");
    assert_eq!(partial.rejected_spans, 1);
    assert_eq!(partial.error_message, "TraceID is invalid");
    assert_eq!(exporter.sender().sent_names().await, vec!["ok"]);
    Ok(())
}

#[tokio::test]
async fn export_after_shutdown_is_cancelled() {
    let exporter = Arc::new(Exporter::new(
        TracesConfig::default(),
        RecordingSender::new(),
    ));
    let shutdown = CancellationToken::new();
    let ingest = TraceIngest::new(Arc::clone(&exporter), shutdown.clone());
    shutdown.cancel();
    let req = trace_request(vec![resource_spans(
        vec![],
        vec![sample_span("a", 1), sample_span("b", 2)],
    )]);

    let status = ingest.export(Request::new(req)).await.unwrap_err();

    assert_eq!(status.code(), Code::Cancelled);
    assert_eq!(status.message(), "context canceled");
    assert!(exporter.sender().sent().await.is_empty());
}

#[tokio::test]
async fn shutdown_mid_request_keeps_earlier_spans() {
    let shutdown = CancellationToken::new();
    let sender = RecordingSender::new().cancel_after(1, shutdown.clone());
    let exporter = Arc::new(Exporter::new(TracesConfig::default(), sender));
    let ingest = TraceIngest::new(Arc::clone(&exporter), shutdown);
    let req = trace_request(vec![resource_spans(
        vec![],
        vec![sample_span("first", 1), sample_span("second", 2)],
    )]);

    let status = ingest.export(Request::new(req)).await.unwrap_err();

    assert_eq!(status.code(), Code::Cancelled);
    assert_eq!(exporter.sender().sent_names().await, vec!["first"]);
}
