use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TanzuError {
    #[error("TraceID is invalid")]
    InvalidTraceId,

    #[error("SpanID is invalid")]
    InvalidSpanId,

    #[error("span sink error: {0}")]
    Sink(#[from] SenderError),

    #[error("context canceled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Failure reported by a span sender while sending, flushing or closing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SenderError(pub String);

impl SenderError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TanzuError>;

/// Every per-span failure observed while pushing one batch.
///
/// Always holds at least one error. A single error displays as itself,
/// several as `[first; second; ...]`.
#[derive(Debug)]
pub struct CombinedError {
    errors: Vec<TanzuError>,
}

impl CombinedError {
    /// Returns `None` when there is nothing to report.
    pub fn combine(errors: Vec<TanzuError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[TanzuError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<TanzuError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false: `combine` never builds an empty value. Kept so `len`
    /// has its usual companion.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, TanzuError::Cancelled))
    }

    /// Errors attributable to individual spans, i.e. everything but the
    /// cancellation marker.
    pub fn span_failures(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| !matches!(e, TanzuError::Cancelled))
            .count()
    }
}

impl fmt::Display for CombinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.errors.as_slice() {
            return write!(f, "{only}");
        }
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "[{joined}]")
    }
}

impl std::error::Error for CombinedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_empty_is_none() {
        assert!(CombinedError::combine(Vec::new()).is_none());
    }

    #[test]
    fn single_error_displays_as_itself() {
        let err = CombinedError::combine(vec![TanzuError::InvalidSpanId]).unwrap();
        assert_eq!(err.to_string(), "SpanID is invalid");
        assert_eq!(err.len(), 1);
        assert!(!err.is_empty());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn multiple_errors_are_bracketed() {
        let err = CombinedError::combine(vec![
            TanzuError::InvalidTraceId,
            TanzuError::Sink(SenderError::new("connection refused")),
            TanzuError::Cancelled,
        ])
        .unwrap();
        assert_eq!(
            err.to_string(),
            "[TraceID is invalid; span sink error: connection refused; context canceled]"
        );
        assert!(err.is_cancelled());
        assert_eq!(err.span_failures(), 2);
    }
}
