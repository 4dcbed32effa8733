use std::sync::atomic::{AtomicBool, Ordering};

use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use tanzu_core::config::{Config, TracesConfig};
use tanzu_core::error::{CombinedError, Result, TanzuError};
use tanzu_core::model::span::Span;
use tanzu_core::sender::{SpanData, SpanSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::transform::TraceTransformer;

/// Pushes OTLP trace batches to Tanzu Observability through a [`SpanSender`].
///
/// Holds no per-batch state, so `push_trace_data` may run concurrently from
/// several tasks as long as the sender tolerates it.
pub struct Exporter<S> {
    cfg: TracesConfig,
    sender: S,
    closed: AtomicBool,
}

impl<S: SpanSender> Exporter<S> {
    pub fn new(cfg: TracesConfig, sender: S) -> Self {
        Self {
            cfg,
            sender,
            closed: AtomicBool::new(false),
        }
    }

    pub fn from_config(cfg: Config, sender: S) -> Result<Self> {
        cfg.validate()?;
        info!(
            tracing_endpoint = %cfg.traces.endpoint,
            "creating Tanzu Observability exporter"
        );
        Ok(Self::new(cfg.traces, sender))
    }

    pub fn config(&self) -> &TracesConfig {
        &self.cfg
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Transforms and sends every span in `req`, in order.
    ///
    /// A span that fails to transform or send is skipped and its error kept;
    /// the rest of the batch still goes out. Once `cancel` fires, no further
    /// span is touched and the collected errors come back together with
    /// [`TanzuError::Cancelled`].
    pub async fn push_trace_data(
        &self,
        cancel: &CancellationToken,
        req: &ExportTraceServiceRequest,
    ) -> std::result::Result<(), CombinedError> {
        let mut errs = Vec::new();

        for rs in &req.resource_spans {
            let transform = TraceTransformer::new(rs.resource.as_ref(), &self.cfg);
            for ss in &rs.scope_spans {
                for orig in &ss.spans {
                    if cancel.is_cancelled() {
                        errs.push(TanzuError::Cancelled);
                        return CombinedError::combine(errs).map_or(Ok(()), Err);
                    }

                    let span = match transform.span(orig) {
                        Ok(span) => span,
                        Err(e) => {
                            errs.push(e);
                            continue;
                        }
                    };

                    if let Err(e) = self.record_span(span).await {
                        errs.push(e);
                    }
                }
            }
        }

        CombinedError::combine(errs).map_or(Ok(()), Err)
    }

    /// Sends one transformed span and flushes the sender.
    pub async fn record_span(&self, span: Span) -> Result<()> {
        self.sender.send_span(span_data(span)).await?;
        self.sender.flush().await?;
        Ok(())
    }

    /// Closes the sender. Only the first call reaches it.
    pub async fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        debug!("closing Tanzu Observability span sender");
        self.sender.close().await;
        Ok(())
    }
}

fn span_data(span: Span) -> SpanData {
    let tags = span.span_tags();
    SpanData {
        name: span.name,
        start_millis: span.start_millis,
        duration_millis: span.duration_millis,
        source: String::new(),
        trace_id: span.trace_id.to_string(),
        span_id: span.span_id.to_string(),
        parents: span
            .parent_span_id
            .map(|id| vec![id.to_string()])
            .unwrap_or_default(),
        follows_from: Vec::new(),
        tags,
        span_logs: span.span_logs,
    }
}
