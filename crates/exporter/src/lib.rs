pub mod exporter;
pub mod otlp;
pub mod transform;

pub use exporter::Exporter;
pub use transform::TraceTransformer;
