use std::sync::Arc;

use opentelemetry_proto::tonic::collector::trace::v1::trace_service_server::{
    TraceService, TraceServiceServer,
};
use opentelemetry_proto::tonic::collector::trace::v1::{
    ExportTracePartialSuccess, ExportTraceServiceRequest, ExportTraceServiceResponse,
};
use tanzu_core::sender::SpanSender;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use crate::exporter::Exporter;

/// OTLP/gRPC trace endpoint that hands every request to an [`Exporter`].
///
/// Cancelling `shutdown` stops in-flight requests before their next span;
/// they answer with `Status::cancelled`.
pub struct TraceIngest<S> {
    exporter: Arc<Exporter<S>>,
    shutdown: CancellationToken,
}

impl<S> Clone for TraceIngest<S> {
    fn clone(&self) -> Self {
        Self {
            exporter: Arc::clone(&self.exporter),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S: SpanSender + 'static> TraceIngest<S> {
    pub fn new(exporter: Arc<Exporter<S>>, shutdown: CancellationToken) -> Self {
        Self { exporter, shutdown }
    }

    pub fn traces_service(&self) -> TraceServiceServer<Self> {
        TraceServiceServer::new(self.clone())
    }
}

#[tonic::async_trait]
impl<S: SpanSender + 'static> TraceService for TraceIngest<S> {
    async fn export(
        &self,
        request: Request<ExportTraceServiceRequest>,
    ) -> std::result::Result<Response<ExportTraceServiceResponse>, Status> {
        let req = request.into_inner();
        let total = req
            .resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .map(|ss| ss.spans.len())
            .sum::<usize>();

        let cancel = self.shutdown.child_token();
        match self.exporter.push_trace_data(&cancel, &req).await {
            Ok(()) => {
                tracing::debug!(count = total, "otlp grpc traces exported");
                Ok(Response::new(ExportTraceServiceResponse::default()))
            }
            Err(err) if err.is_cancelled() => Err(Status::cancelled(err.to_string())),
            Err(err) => {
                let rejected = err.span_failures();
                tracing::debug!(
                    count = total,
                    rejected,
                    "otlp grpc traces partially exported"
                );
                Ok(Response::new(ExportTraceServiceResponse {
                    partial_success: Some(ExportTracePartialSuccess {
                        rejected_spans: rejected as i64,
                        error_message: err.to_string(),
                    }),
                }))
            }
        }
    }
}
